use std::sync::Arc;

use tracing::info;

use crate::error::{ReleaseDroidError, Result};
use crate::gateway::{ForgeGateway, ReleaseRecord};
use crate::release::ReleaseMaker;
use crate::repository::Repository;

/// Creates a forge release and uploads every deliverable to it
pub struct GitHubReleaseMaker {
    forge: Arc<dyn ForgeGateway>,
}

impl GitHubReleaseMaker {
    pub fn new(forge: Arc<dyn ForgeGateway>) -> Self {
        GitHubReleaseMaker { forge }
    }

    fn release_record(repository: &dyn Repository) -> Result<ReleaseRecord> {
        let version = repository.version()?;
        let letter = repository.release_letter(&version)?;
        let header = match letter.header() {
            Some(code_name) => format!("{}: {}", version, code_name),
            None => version.clone(),
        };

        ReleaseRecord::builder()
            .repository(repository.name())
            .version(&version)
            .header(header)
            .body(letter.body().unwrap_or_default())
            .target_branch(repository.branch_name())
            .assets(repository.deliverables()?)
            .build()
    }
}

impl ReleaseMaker for GitHubReleaseMaker {
    fn make_release(&self, repository: &dyn Repository) -> Result<String> {
        let record = Self::release_record(repository)?;
        info!(repository = record.repository(), version = record.version(), "creating GitHub release");

        let handle = self.forge.create_release(&record)?;
        let mut uploaded = Vec::new();
        for (name, path) in record.assets() {
            info!(asset = %name, path = %path, "uploading release asset");
            if let Err(e) = self.forge.upload_asset(&handle, name, path) {
                let done = if uploaded.is_empty() {
                    "none".to_string()
                } else {
                    uploaded.join(", ")
                };
                return Err(ReleaseDroidError::release(format!(
                    "release {} was created but uploading stopped: {}. Uploaded assets: {}",
                    record.version(),
                    e,
                    done
                )));
            }
            uploaded.push(name.as_str());
        }

        Ok(format!(
            "Release {} created on GitHub with {} asset(s).",
            record.version(),
            uploaded.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockForge;
    use crate::repository::{
        open_repository, release_letter_path, MemorySource, BUILD_SBT_PATH, CHANGELOG_PATH,
    };

    fn repository() -> Box<dyn Repository> {
        let mut source = MemorySource::new("exasol/spark-connector", "main");
        source.add_file(BUILD_SBT_PATH, "version := \"1.1.0\"");
        source.add_file(CHANGELOG_PATH, "* [1.1.0](changes_1.1.0.md)");
        source.add_file(
            &release_letter_path("1.1.0"),
            "# Spark 1.1.0, released 2024-05-17\n\nCode name: Faster reads\n\n## Summary\nFaster.\n",
        );
        open_repository(Box::new(source))
    }

    #[test]
    fn test_release_and_upload() {
        let forge = Arc::new(MockForge::new());
        let maker = GitHubReleaseMaker::new(forge.clone());

        let message = maker.make_release(repository().as_ref()).unwrap();
        assert!(message.contains("1.1.0"));

        let releases = forge.releases();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].header(), "1.1.0: Faster reads");
        assert_eq!(releases[0].target_branch(), "main");
        assert_eq!(
            forge.uploads(),
            vec![(
                "spark-connector-1.1.0.jar".to_string(),
                "./target/scala-2.12/spark-connector-1.1.0.jar".to_string()
            )]
        );
    }

    #[test]
    fn test_failed_upload_reports_partial_release() {
        let mut forge = MockForge::new();
        forge.fail_uploads_after(0);
        let maker = GitHubReleaseMaker::new(Arc::new(forge));

        let err = maker.make_release(repository().as_ref()).unwrap_err();
        assert!(err.to_string().contains("Uploaded assets: none"));
    }

    #[test]
    fn test_failed_creation() {
        let mut forge = MockForge::new();
        forge.fail_release_creation("HTTP 422");
        let forge = Arc::new(forge);
        let maker = GitHubReleaseMaker::new(forge.clone());

        assert!(maker.make_release(repository().as_ref()).is_err());
        assert!(forge.uploads().is_empty());
    }
}
