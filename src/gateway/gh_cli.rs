use std::collections::BTreeSet;
use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::json;
use tracing::debug;

use super::{
    ForgeGateway, GatewayError, GatewayResult, ReleaseRecord, UploadHandle, WorkflowTrigger,
};

/// Forge gateway backed by the GitHub `gh` CLI.
///
/// Authentication, timeouts and retries are whatever `gh` is configured with.
pub struct GhCliGateway {
    program: String,
    asset_workflow: String,
}

impl GhCliGateway {
    /// `asset_workflow` is the workflow file dispatched to upload release assets
    pub fn new(asset_workflow: impl Into<String>) -> Self {
        GhCliGateway {
            program: "gh".to_string(),
            asset_workflow: asset_workflow.into(),
        }
    }

    /// Use a different executable, e.g. a wrapper script
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn api(&self, operation: &str, args: &[&str], input: Option<String>) -> GatewayResult<String> {
        debug!(operation, ?args, "calling gh api");
        let mut cmd = Command::new(&self.program);
        cmd.arg("api").args(args);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        if input.is_some() {
            cmd.stdin(Stdio::piped());
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| GatewayError::new(operation, format!("cannot run {}: {}", self.program, e)))?;

        if let (Some(payload), Some(mut stdin)) = (input, child.stdin.take()) {
            stdin
                .write_all(payload.as_bytes())
                .map_err(|e| GatewayError::new(operation, e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| GatewayError::new(operation, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GatewayError::new(
                operation,
                format!(
                    "exit code {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn dispatch(
        &self,
        operation: &str,
        repository: &str,
        workflow_id: &str,
        payload: &serde_json::Value,
    ) -> GatewayResult<()> {
        let endpoint = format!(
            "repos/{}/actions/workflows/{}/dispatches",
            repository, workflow_id
        );
        self.api(
            operation,
            &["-X", "POST", &endpoint, "--input", "-"],
            Some(payload.to_string()),
        )?;
        Ok(())
    }
}

fn is_not_found(err: &GatewayError) -> bool {
    err.cause.contains("HTTP 404") || err.cause.contains("Not Found")
}

impl ForgeGateway for GhCliGateway {
    fn closed_issue_numbers(&self, repository: &str) -> GatewayResult<BTreeSet<u32>> {
        let operation = "list closed issues";
        let endpoint = format!("repos/{}/issues?state=closed&per_page=100", repository);
        let output = self.api(operation, &["--paginate", &endpoint, "--jq", ".[].number"], None)?;
        output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                line.trim().parse::<u32>().map_err(|_| {
                    GatewayError::new(operation, format!("unexpected issue number '{}'", line))
                })
            })
            .collect()
    }

    fn create_release(&self, release: &ReleaseRecord) -> GatewayResult<UploadHandle> {
        let operation = "create release";
        let endpoint = format!("repos/{}/releases", release.repository());
        let payload = json!({
            "tag_name": release.version(),
            "target_commitish": release.target_branch(),
            "name": release.header(),
            "body": release.body(),
            "draft": false,
            "prerelease": false,
        });
        let output = self.api(
            operation,
            &["-X", "POST", &endpoint, "--input", "-"],
            Some(payload.to_string()),
        )?;
        let response: serde_json::Value = serde_json::from_str(&output)
            .map_err(|e| GatewayError::new(operation, format!("invalid response: {}", e)))?;
        let upload_url = response["upload_url"]
            .as_str()
            .ok_or_else(|| GatewayError::new(operation, "response has no upload_url"))?;

        Ok(UploadHandle {
            repository: release.repository().to_string(),
            target_branch: release.target_branch().to_string(),
            upload_url: upload_url.to_string(),
        })
    }

    /// Assets are built by a workflow on the forge, so uploading means dispatching it
    fn upload_asset(&self, handle: &UploadHandle, name: &str, path: &str) -> GatewayResult<()> {
        let payload = json!({
            "ref": handle.target_branch,
            "inputs": {
                "upload_url": handle.upload_url,
                "asset_name": name,
                "asset_path": path,
            }
        });
        self.dispatch(
            &format!("upload asset {}", name),
            &handle.repository,
            &self.asset_workflow,
            &payload,
        )
    }

    fn read_file(&self, repository: &str, branch: &str, path: &str) -> GatewayResult<String> {
        let endpoint = format!("repos/{}/contents/{}?ref={}", repository, path, branch);
        self.api(
            &format!("read file {}", path),
            &["-H", "Accept: application/vnd.github.raw", &endpoint],
            None,
        )
    }

    fn default_branch_name(&self, repository: &str) -> GatewayResult<String> {
        let endpoint = format!("repos/{}", repository);
        let output = self.api(
            "get default branch",
            &[&endpoint, "--jq", ".default_branch"],
            None,
        )?;
        Ok(output.trim().to_string())
    }

    fn latest_tag(&self, repository: &str) -> GatewayResult<Option<String>> {
        let endpoint = format!("repos/{}/releases/latest", repository);
        match self.api("get latest release", &[&endpoint, "--jq", ".tag_name"], None) {
            Ok(output) => {
                let tag = output.trim();
                Ok((!tag.is_empty()).then(|| tag.to_string()))
            }
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl WorkflowTrigger for GhCliGateway {
    fn trigger_workflow(
        &self,
        repository: &str,
        workflow_id: &str,
        payload: &serde_json::Value,
    ) -> GatewayResult<()> {
        self.dispatch(
            &format!("trigger workflow {}", workflow_id),
            repository,
            workflow_id,
            payload,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_gateway_error() {
        let gateway = GhCliGateway::new("upload.yml").with_program("definitely-not-a-gh-binary");
        let err = gateway.default_branch_name("exasol/project").unwrap_err();
        assert_eq!(err.operation, "get default branch");
        assert!(err.cause.contains("cannot run"));
    }

    #[test]
    fn test_not_found_detection() {
        assert!(is_not_found(&GatewayError::new("x", "exit code 1: gh: Not Found (HTTP 404)")));
        assert!(!is_not_found(&GatewayError::new("x", "exit code 1: HTTP 401")));
    }
}
