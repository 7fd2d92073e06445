use tracing::debug;

use crate::error::Result;
use crate::report::{CheckResult, Report};
use crate::repository::Repository;
use crate::validation::RepositoryValidator;

/// Forge release needs the workflow that uploads release assets
pub struct GitHubPlatformValidator {
    workflow_path: String,
}

impl GitHubPlatformValidator {
    pub fn new(workflow_path: impl Into<String>) -> Self {
        GitHubPlatformValidator {
            workflow_path: workflow_path.into(),
        }
    }
}

impl RepositoryValidator for GitHubPlatformValidator {
    fn name(&self) -> &'static str {
        "github"
    }

    fn validate(&self, repository: &dyn Repository) -> Result<Report> {
        debug!(workflow = %self.workflow_path, "validating GitHub platform requirements");
        let result = if repository.has_file(&self.workflow_path) {
            CheckResult::success("GitHub release workflow exists.")
        } else {
            CheckResult::failure(
                "E-RD-GH-25",
                format!(
                    "The workflow '{}' is missing. Please add it to the repository, it uploads the release assets.",
                    self.workflow_path
                ),
            )
        };
        Ok(Report::validation().with(result))
    }
}
