//! Collaborator contracts for remote systems
//!
//! The release core never talks to the network directly. Everything it needs
//! from the forge, the registry publish workflow and the community portal goes
//! through the traits in this module, so the core can be exercised against the
//! in-memory doubles in [`mock`].
//!
//! - [`gh_cli::GhCliGateway`]: forge and workflow access through the `gh` CLI
//! - [`drafts::DraftDirectoryPortal`]: community drafts written to a directory
//! - [`mock`]: recording test doubles
//!
//! Timeouts and retries are owned by the implementations. Every failure,
//! including a timeout, surfaces as a [`GatewayError`].

pub mod drafts;
pub mod gh_cli;
pub mod mock;

pub use drafts::DraftDirectoryPortal;
pub use gh_cli::GhCliGateway;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::error::{ReleaseDroidError, Result};

/// A remote call failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {cause}")]
pub struct GatewayError {
    pub operation: String,
    pub cause: String,
}

impl GatewayError {
    pub fn new(operation: impl Into<String>, cause: impl Into<String>) -> Self {
        GatewayError {
            operation: operation.into(),
            cause: cause.into(),
        }
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Where assets of a freshly created release are uploaded to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadHandle {
    pub repository: String,
    pub target_branch: String,
    pub upload_url: String,
}

/// Forge operations needed for validation and release
pub trait ForgeGateway: Send + Sync {
    /// Numbers of all closed issues of `owner/name`
    fn closed_issue_numbers(&self, repository: &str) -> GatewayResult<BTreeSet<u32>>;

    /// Create a release and return where its assets go
    fn create_release(&self, release: &ReleaseRecord) -> GatewayResult<UploadHandle>;

    /// Upload one deliverable to a created release
    fn upload_asset(&self, handle: &UploadHandle, name: &str, path: &str) -> GatewayResult<()>;

    /// Raw text of a file on a branch
    fn read_file(&self, repository: &str, branch: &str, path: &str) -> GatewayResult<String>;

    fn default_branch_name(&self, repository: &str) -> GatewayResult<String>;

    /// Latest release tag, `None` before the first release
    fn latest_tag(&self, repository: &str) -> GatewayResult<Option<String>>;
}

/// Starts a remote publish workflow without waiting for it to finish
pub trait WorkflowTrigger: Send + Sync {
    fn trigger_workflow(
        &self,
        repository: &str,
        workflow_id: &str,
        payload: &serde_json::Value,
    ) -> GatewayResult<()>;
}

/// Announcement drafts on the community portal
pub trait CommunityPortalGateway: Send + Sync {
    fn send_draft_post(&self, post: &CommunityPost) -> GatewayResult<()>;
}

/// Immutable description of a forge release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    repository: String,
    version: String,
    header: String,
    body: String,
    target_branch: String,
    assets: BTreeMap<String, String>,
}

impl ReleaseRecord {
    pub fn builder() -> ReleaseRecordBuilder {
        ReleaseRecordBuilder::default()
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn target_branch(&self) -> &str {
        &self.target_branch
    }

    /// Asset name to on-disk path
    pub fn assets(&self) -> &BTreeMap<String, String> {
        &self.assets
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReleaseRecordBuilder {
    repository: Option<String>,
    version: Option<String>,
    header: Option<String>,
    body: Option<String>,
    target_branch: Option<String>,
    assets: BTreeMap<String, String>,
}

impl ReleaseRecordBuilder {
    pub fn repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn target_branch(mut self, branch: impl Into<String>) -> Self {
        self.target_branch = Some(branch.into());
        self
    }

    pub fn assets(mut self, assets: BTreeMap<String, String>) -> Self {
        self.assets = assets;
        self
    }

    /// Repository, version and target branch are mandatory; the header falls back to the version
    pub fn build(self) -> Result<ReleaseRecord> {
        let repository = self
            .repository
            .ok_or_else(|| ReleaseDroidError::release("release record needs a repository"))?;
        let version = self
            .version
            .ok_or_else(|| ReleaseDroidError::release("release record needs a version"))?;
        let target_branch = self
            .target_branch
            .ok_or_else(|| ReleaseDroidError::release("release record needs a target branch"))?;
        let header = self
            .header
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| version.clone());

        Ok(ReleaseRecord {
            repository,
            header,
            body: self.body.unwrap_or_default(),
            version,
            target_branch,
            assets: self.assets,
        })
    }
}

/// Draft announcement for the community portal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunityPost {
    pub board_id: String,
    pub header: String,
    pub tags: Vec<String>,
    pub body: String,
}
