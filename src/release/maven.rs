use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::error::Result;
use crate::gateway::WorkflowTrigger;
use crate::release::ReleaseMaker;
use crate::repository::Repository;

/// Starts the Maven Central deploy workflow; completion is not awaited
pub struct MavenReleaseMaker {
    trigger: Arc<dyn WorkflowTrigger>,
    workflow_id: String,
}

impl MavenReleaseMaker {
    pub fn new(trigger: Arc<dyn WorkflowTrigger>, workflow_id: impl Into<String>) -> Self {
        MavenReleaseMaker {
            trigger,
            workflow_id: workflow_id.into(),
        }
    }
}

impl ReleaseMaker for MavenReleaseMaker {
    fn make_release(&self, repository: &dyn Repository) -> Result<String> {
        info!(repository = repository.name(), workflow = %self.workflow_id, "triggering Maven Central release");
        let payload = json!({ "ref": repository.branch_name() });
        self.trigger
            .trigger_workflow(repository.name(), &self.workflow_id, &payload)?;
        Ok(format!(
            "Workflow {} was triggered. Check the repository actions for the deployment result.",
            self.workflow_id
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockWorkflowTrigger;
    use crate::repository::{open_repository, MemorySource};

    #[test]
    fn test_triggers_workflow_for_branch() {
        let trigger = Arc::new(MockWorkflowTrigger::new());
        let maker = MavenReleaseMaker::new(trigger.clone(), "maven_central_release.yml");
        let repository = open_repository(Box::new(MemorySource::new("exasol/project", "main")));

        maker.make_release(repository.as_ref()).unwrap();

        let triggered = trigger.triggered();
        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].0, "exasol/project");
        assert_eq!(triggered[0].1, "maven_central_release.yml");
        assert_eq!(triggered[0].2, json!({"ref": "main"}));
    }

    #[test]
    fn test_rejected_trigger_is_error() {
        let maker = MavenReleaseMaker::new(
            Arc::new(MockWorkflowTrigger::failing("HTTP 404")),
            "maven_central_release.yml",
        );
        let repository = open_repository(Box::new(MemorySource::new("exasol/project", "main")));
        let err = maker.make_release(repository.as_ref()).unwrap_err();
        assert!(err.to_string().contains("HTTP 404"));
    }
}
