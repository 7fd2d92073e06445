use std::sync::Arc;

use tracing::debug;

use crate::error::{ReleaseDroidError, Result};
use crate::gateway::{ForgeGateway, GatewayResult};

/// Where the files of one branch come from
pub trait ContentSource: Send + Sync {
    /// `owner/name`
    fn repository_name(&self) -> &str;

    fn branch_name(&self) -> &str;

    /// Raw text of a file on the branch
    fn read_file(&self, path: &str) -> Result<String>;

    fn has_file(&self, path: &str) -> bool {
        self.read_file(path).is_ok()
    }

    fn is_on_default_branch(&self) -> Result<bool>;

    /// Latest release tag, `None` before the first release.
    ///
    /// A failed lookup fails the legality check only, so it stays a gateway error.
    fn latest_tag(&self) -> GatewayResult<Option<String>>;
}

/// Branch content served by the forge
pub struct ForgeSource {
    forge: Arc<dyn ForgeGateway>,
    repository: String,
    branch: String,
    default_branch: String,
}

impl ForgeSource {
    /// Bind to `branch`, or to the default branch when none is given
    pub fn new(
        forge: Arc<dyn ForgeGateway>,
        repository: impl Into<String>,
        branch: Option<&str>,
    ) -> Result<Self> {
        let repository = repository.into();
        let default_branch = forge.default_branch_name(&repository).map_err(|e| {
            ReleaseDroidError::repository_access(
                "E-RD-REP-7",
                format!(
                    "Cannot find the default branch of '{}': {}. Please check the repository name and owner.",
                    repository, e
                ),
            )
        })?;
        let branch = branch
            .map(str::to_string)
            .unwrap_or_else(|| default_branch.clone());
        debug!(repository = %repository, branch = %branch, default_branch = %default_branch, "bound forge source");

        Ok(ForgeSource {
            forge,
            repository,
            branch,
            default_branch,
        })
    }
}

impl ContentSource for ForgeSource {
    fn repository_name(&self) -> &str {
        &self.repository
    }

    fn branch_name(&self) -> &str {
        &self.branch
    }

    fn read_file(&self, path: &str) -> Result<String> {
        self.forge
            .read_file(&self.repository, &self.branch, path)
            .map_err(|e| {
                ReleaseDroidError::repository_access(
                    "E-RD-REP-2",
                    format!(
                        "Cannot read '{}' from branch '{}' of '{}': {}",
                        path, self.branch, self.repository, e
                    ),
                )
            })
    }

    fn is_on_default_branch(&self) -> Result<bool> {
        Ok(self.branch == self.default_branch)
    }

    fn latest_tag(&self) -> GatewayResult<Option<String>> {
        self.forge.latest_tag(&self.repository)
    }
}
