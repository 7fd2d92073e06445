//! Main workflow orchestration logic
//!
//! Wires configuration, gateways, repository and platforms into a
//! [`ReleaseDroid`] run. Kept apart from clap so the workflow can be driven
//! programmatically and tested with in-memory gateways.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::Config;
use crate::domain::{Goal, PlatformName, UserInput};
use crate::error::Result;
use crate::gateway::{
    CommunityPortalGateway, DraftDirectoryPortal, ForgeGateway, GhCliGateway, WorkflowTrigger,
};
use crate::release::{CommunityPortalReleaseMaker, GitHubReleaseMaker, MavenReleaseMaker};
use crate::repository::{open_repository, ContentSource, ForgeSource, LocalSource, Repository};
use crate::usecases::{Platform, PlatformRegistry, ReleaseDroid, RunOutcome};
use crate::validation::{
    CommunityPlatformValidator, GitHubPlatformValidator, MavenPlatformValidator,
    RepositoryValidator, StructureValidator, TicketValidator,
};

/// Arguments of one run
///
/// Mirrors the CLI Args in plain strings so the workflow does not depend on clap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunArgs {
    pub name: Option<String>,
    pub owner: Option<String>,
    pub goal: Option<String>,
    pub platforms: Vec<String>,
    pub branch: Option<String>,
    pub local_path: Option<PathBuf>,
}

/// Result of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub input: UserInput,
    /// Branch the repository was bound to
    pub branch: String,
    pub outcome: RunOutcome,
}

/// Remote collaborators of a run
#[derive(Clone)]
pub struct Gateways {
    pub forge: Arc<dyn ForgeGateway>,
    pub trigger: Arc<dyn WorkflowTrigger>,
    pub portal: Arc<dyn CommunityPortalGateway>,
}

impl Gateways {
    /// `gh` CLI for the forge and workflows, a draft directory for the community portal
    pub fn from_config(config: &Config) -> Self {
        let gh = Arc::new(GhCliGateway::new(workflow_file_name(&config.github.workflow_path)));
        Gateways {
            forge: gh.clone(),
            trigger: gh,
            portal: Arc::new(DraftDirectoryPortal::new(
                config.community.drafts_directory.clone(),
            )),
        }
    }
}

/// Workflows are dispatched by file name, not by path
fn workflow_file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Validate the raw arguments into a [`UserInput`]
pub fn build_user_input(args: &RunArgs) -> Result<UserInput> {
    let mut builder = UserInput::builder();
    if let Some(goal) = &args.goal {
        builder = builder.goal(goal.parse::<Goal>()?);
    }
    if !args.platforms.is_empty() {
        builder = builder.platforms(PlatformName::parse_list(&args.platforms)?);
    }
    if let Some(name) = &args.name {
        builder = builder.repository_name(name);
    }
    if let Some(owner) = &args.owner {
        builder = builder.repository_owner(owner);
    }
    if let Some(branch) = &args.branch {
        builder = builder.branch(branch);
    }
    if let Some(path) = &args.local_path {
        builder = builder.local_path(path);
    }
    builder.build()
}

/// Every supported platform wired to its validator and release maker
pub fn build_platforms(config: &Config, gateways: &Gateways) -> PlatformRegistry {
    PlatformRegistry::new()
        .with(Platform::new(
            PlatformName::Maven,
            Box::new(MavenPlatformValidator::new(&config.maven.workflow_path)),
            Box::new(MavenReleaseMaker::new(
                gateways.trigger.clone(),
                &config.maven.workflow_id,
            )),
        ))
        .with(Platform::new(
            PlatformName::Github,
            Box::new(GitHubPlatformValidator::new(&config.github.workflow_path)),
            Box::new(GitHubReleaseMaker::new(gateways.forge.clone())),
        ))
        .with(Platform::new(
            PlatformName::Community,
            Box::new(CommunityPlatformValidator::new(
                &config.community.template_path,
            )),
            Box::new(CommunityPortalReleaseMaker::new(
                gateways.portal.clone(),
                &config.community.template_path,
                &config.community.board_id,
            )),
        ))
}

/// Orchestrator with the structure checks for `today`
pub fn build_release_droid(config: &Config, gateways: &Gateways, today: NaiveDate) -> ReleaseDroid {
    let structure: Vec<Box<dyn RepositoryValidator>> = vec![
        Box::new(StructureValidator::new(today)),
        Box::new(TicketValidator::new(gateways.forge.clone())),
    ];
    ReleaseDroid::new(structure, build_platforms(config, gateways))
}

/// Local checkout when a path was given, the forge otherwise
pub fn open_for_input(input: &UserInput, forge: Arc<dyn ForgeGateway>) -> Result<Box<dyn Repository>> {
    let source: Box<dyn ContentSource> = match input.local_path() {
        Some(path) => Box::new(LocalSource::open(path, input.full_repository_name())?),
        None => Box::new(ForgeSource::new(
            forge,
            input.full_repository_name(),
            input.branch(),
        )?),
    };
    Ok(open_repository(source))
}

/// Main release-droid workflow
///
/// 1. Validate user input
/// 2. Open the repository at the requested branch
/// 3. Validate, and release the platforms that passed when the goal is release
pub fn run_release_droid(
    args: &RunArgs,
    config: &Config,
    gateways: &Gateways,
    today: NaiveDate,
) -> Result<RunSummary> {
    let input = build_user_input(args)?;
    debug!(?input, "user input accepted");

    let repository = open_for_input(&input, gateways.forge.clone())?;
    let droid = build_release_droid(config, gateways, today);
    let outcome = droid.run(&input, repository.as_ref())?;

    Ok(RunSummary {
        branch: repository.branch_name().to_string(),
        input,
        outcome,
    })
}
