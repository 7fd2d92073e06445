use std::fs;
use std::path::PathBuf;

use tracing::info;

use super::{CommunityPortalGateway, CommunityPost, GatewayError, GatewayResult};

/// Stores community portal drafts as JSON files for manual posting
pub struct DraftDirectoryPortal {
    directory: PathBuf,
}

impl DraftDirectoryPortal {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        DraftDirectoryPortal {
            directory: directory.into(),
        }
    }

    fn file_name(post: &CommunityPost) -> String {
        let slug: String = post
            .header
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        format!("{}.json", slug.trim_matches('-'))
    }
}

impl CommunityPortalGateway for DraftDirectoryPortal {
    fn send_draft_post(&self, post: &CommunityPost) -> GatewayResult<()> {
        let operation = "store community draft";
        fs::create_dir_all(&self.directory)
            .map_err(|e| GatewayError::new(operation, e.to_string()))?;
        let path = self.directory.join(Self::file_name(post));
        let json = serde_json::to_string_pretty(post)
            .map_err(|e| GatewayError::new(operation, e.to_string()))?;
        fs::write(&path, json).map_err(|e| GatewayError::new(operation, e.to_string()))?;
        info!(path = %path.display(), "community portal draft stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_draft_is_written_as_json() {
        let dir = TempDir::new().unwrap();
        let portal = DraftDirectoryPortal::new(dir.path().join("drafts"));
        let post = CommunityPost {
            board_id: "ProductNews".to_string(),
            header: "Virtual Schema 1.0.0 released".to_string(),
            tags: vec!["Release Droid".to_string()],
            body: "<p>body</p>".to_string(),
        };

        portal.send_draft_post(&post).unwrap();

        let written = fs::read_to_string(
            dir.path()
                .join("drafts")
                .join("virtual-schema-1-0-0-released.json"),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["board_id"], "ProductNews");
        assert_eq!(value["tags"][0], "Release Droid");
    }
}
