use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use super::{
    CommunityPortalGateway, CommunityPost, ForgeGateway, GatewayError, GatewayResult,
    ReleaseRecord, UploadHandle, WorkflowTrigger,
};

/// In-memory forge that records every write for later inspection
pub struct MockForge {
    files: HashMap<(String, String), String>,
    default_branch: String,
    latest_tag: Option<String>,
    closed_issues: BTreeSet<u32>,
    issues_error: Option<String>,
    release_error: Option<String>,
    latest_tag_error: Option<String>,
    uploads_before_failure: Option<usize>,
    releases: Mutex<Vec<ReleaseRecord>>,
    uploads: Mutex<Vec<(String, String)>>,
    file_reads: Mutex<usize>,
}

impl MockForge {
    /// Empty forge whose default branch is `main`
    pub fn new() -> Self {
        MockForge {
            files: HashMap::new(),
            default_branch: "main".to_string(),
            latest_tag: None,
            closed_issues: BTreeSet::new(),
            issues_error: None,
            release_error: None,
            latest_tag_error: None,
            uploads_before_failure: None,
            releases: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            file_reads: Mutex::new(0),
        }
    }

    /// Put a file on a branch
    pub fn add_file(
        &mut self,
        branch: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
    ) {
        self.files
            .insert((branch.into(), path.into()), content.into());
    }

    pub fn set_default_branch(&mut self, branch: impl Into<String>) {
        self.default_branch = branch.into();
    }

    pub fn set_latest_tag(&mut self, tag: impl Into<String>) {
        self.latest_tag = Some(tag.into());
    }

    pub fn set_closed_issues(&mut self, issues: impl IntoIterator<Item = u32>) {
        self.closed_issues = issues.into_iter().collect();
    }

    /// Make the closed-issue lookup fail with `cause`
    pub fn fail_issue_lookup(&mut self, cause: impl Into<String>) {
        self.issues_error = Some(cause.into());
    }

    /// Make release creation fail with `cause`
    pub fn fail_release_creation(&mut self, cause: impl Into<String>) {
        self.release_error = Some(cause.into());
    }

    /// Make the latest tag lookup fail with `cause`
    pub fn fail_latest_tag(&mut self, cause: impl Into<String>) {
        self.latest_tag_error = Some(cause.into());
    }

    /// Accept `count` uploads, then fail every further one
    pub fn fail_uploads_after(&mut self, count: usize) {
        self.uploads_before_failure = Some(count);
    }

    /// Releases created so far
    pub fn releases(&self) -> Vec<ReleaseRecord> {
        self.releases.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Uploaded assets as `(name, path)` pairs
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().map(|u| u.clone()).unwrap_or_default()
    }

    pub fn file_reads(&self) -> usize {
        self.file_reads.lock().map(|n| *n).unwrap_or(0)
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(operation: &str) -> GatewayError {
    GatewayError::new(operation, "mock state poisoned")
}

impl ForgeGateway for MockForge {
    fn closed_issue_numbers(&self, _repository: &str) -> GatewayResult<BTreeSet<u32>> {
        match &self.issues_error {
            Some(cause) => Err(GatewayError::new("list closed issues", cause.clone())),
            None => Ok(self.closed_issues.clone()),
        }
    }

    fn create_release(&self, release: &ReleaseRecord) -> GatewayResult<UploadHandle> {
        if let Some(cause) = &self.release_error {
            return Err(GatewayError::new("create release", cause.clone()));
        }
        self.releases
            .lock()
            .map_err(|_| poisoned("create release"))?
            .push(release.clone());
        Ok(UploadHandle {
            repository: release.repository().to_string(),
            target_branch: release.target_branch().to_string(),
            upload_url: format!(
                "https://uploads.example.test/{}/releases/{}/assets",
                release.repository(),
                release.version()
            ),
        })
    }

    fn upload_asset(&self, _handle: &UploadHandle, name: &str, path: &str) -> GatewayResult<()> {
        let operation = format!("upload asset {}", name);
        let mut uploads = self.uploads.lock().map_err(|_| poisoned(&operation))?;
        if let Some(limit) = self.uploads_before_failure {
            if uploads.len() >= limit {
                return Err(GatewayError::new(operation, "connection reset"));
            }
        }
        uploads.push((name.to_string(), path.to_string()));
        Ok(())
    }

    fn read_file(&self, _repository: &str, branch: &str, path: &str) -> GatewayResult<String> {
        let operation = format!("read file {}", path);
        *self.file_reads.lock().map_err(|_| poisoned(&operation))? += 1;
        self.files
            .get(&(branch.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| GatewayError::new(operation, "HTTP 404 Not Found"))
    }

    fn default_branch_name(&self, _repository: &str) -> GatewayResult<String> {
        Ok(self.default_branch.clone())
    }

    fn latest_tag(&self, _repository: &str) -> GatewayResult<Option<String>> {
        match &self.latest_tag_error {
            Some(cause) => Err(GatewayError::new("get latest release", cause.clone())),
            None => Ok(self.latest_tag.clone()),
        }
    }
}

/// Records triggered workflows
#[derive(Default)]
pub struct MockWorkflowTrigger {
    error: Option<String>,
    triggered: Mutex<Vec<(String, String, serde_json::Value)>>,
}

impl MockWorkflowTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger that rejects every dispatch
    pub fn failing(cause: impl Into<String>) -> Self {
        MockWorkflowTrigger {
            error: Some(cause.into()),
            triggered: Mutex::new(Vec::new()),
        }
    }

    /// Dispatches as `(repository, workflow id, payload)`
    pub fn triggered(&self) -> Vec<(String, String, serde_json::Value)> {
        self.triggered.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

impl WorkflowTrigger for MockWorkflowTrigger {
    fn trigger_workflow(
        &self,
        repository: &str,
        workflow_id: &str,
        payload: &serde_json::Value,
    ) -> GatewayResult<()> {
        let operation = format!("trigger workflow {}", workflow_id);
        if let Some(cause) = &self.error {
            return Err(GatewayError::new(operation, cause.clone()));
        }
        self.triggered.lock().map_err(|_| poisoned(&operation))?.push((
            repository.to_string(),
            workflow_id.to_string(),
            payload.clone(),
        ));
        Ok(())
    }
}

/// Records community drafts
#[derive(Default)]
pub struct MockPortal {
    error: Option<String>,
    posts: Mutex<Vec<CommunityPost>>,
}

impl MockPortal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(cause: impl Into<String>) -> Self {
        MockPortal {
            error: Some(cause.into()),
            posts: Mutex::new(Vec::new()),
        }
    }

    pub fn posts(&self) -> Vec<CommunityPost> {
        self.posts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl CommunityPortalGateway for MockPortal {
    fn send_draft_post(&self, post: &CommunityPost) -> GatewayResult<()> {
        if let Some(cause) = &self.error {
            return Err(GatewayError::new("send draft post", cause.clone()));
        }
        self.posts
            .lock()
            .map_err(|_| poisoned("send draft post"))?
            .push(post.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_forge_files_per_branch() {
        let mut forge = MockForge::new();
        forge.add_file("main", "pom.xml", "<project/>");

        assert_eq!(forge.read_file("o/r", "main", "pom.xml").unwrap(), "<project/>");
        assert!(forge.read_file("o/r", "dev", "pom.xml").is_err());
        assert_eq!(forge.file_reads(), 2);
    }

    #[test]
    fn test_mock_forge_upload_limit() {
        let mut forge = MockForge::new();
        forge.fail_uploads_after(1);
        let handle = UploadHandle {
            repository: "o/r".to_string(),
            target_branch: "main".to_string(),
            upload_url: "u".to_string(),
        };

        assert!(forge.upload_asset(&handle, "a.jar", "./target/a.jar").is_ok());
        assert!(forge.upload_asset(&handle, "b.jar", "./target/b.jar").is_err());
        assert_eq!(forge.uploads().len(), 1);
    }

    #[test]
    fn test_mock_trigger_records_payload() {
        let trigger = MockWorkflowTrigger::new();
        trigger
            .trigger_workflow("o/r", "release.yml", &serde_json::json!({"ref": "main"}))
            .unwrap();
        assert_eq!(trigger.triggered()[0].2["ref"], "main");

        let failing = MockWorkflowTrigger::failing("HTTP 500");
        assert!(failing
            .trigger_workflow("o/r", "release.yml", &serde_json::json!({}))
            .is_err());
    }
}
