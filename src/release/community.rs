use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::error::{ReleaseDroidError, Result};
use crate::gateway::{CommunityPortalGateway, CommunityPost};
use crate::release::ReleaseMaker;
use crate::repository::Repository;

/// Project-supplied announcement template
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommunityPortalTemplate {
    #[serde(rename = "project name", default)]
    pub project_name: String,
    #[serde(rename = "project description", default)]
    pub project_description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CommunityPortalTemplate {
    pub fn parse(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Posts a release announcement draft to the community portal
pub struct CommunityPortalReleaseMaker {
    portal: Arc<dyn CommunityPortalGateway>,
    template_path: String,
    board_id: String,
}

impl CommunityPortalReleaseMaker {
    pub fn new(
        portal: Arc<dyn CommunityPortalGateway>,
        template_path: impl Into<String>,
        board_id: impl Into<String>,
    ) -> Self {
        CommunityPortalReleaseMaker {
            portal,
            template_path: template_path.into(),
            board_id: board_id.into(),
        }
    }

    fn community_post(&self, repository: &dyn Repository) -> Result<CommunityPost> {
        let version = repository.version()?;
        let json = repository.read_file(&self.template_path)?;
        let template = CommunityPortalTemplate::parse(&json).map_err(|e| {
            ReleaseDroidError::release(format!(
                "cannot parse community portal template '{}': {}",
                self.template_path, e
            ))
        })?;
        let letter = repository.release_letter(&version)?;
        let summary = letter.summary().ok_or_else(|| {
            ReleaseDroidError::release(format!(
                "the release letter {} has no '## Summary' section",
                letter.file_name()
            ))
        })?;

        let header = format!("{} {}", template.project_name, version);
        let release_link = format!(
            "https://github.com/{}/releases/tag/{}",
            repository.name(),
            version
        );
        let body = render_body(&header, &template.project_description, &summary, &release_link);

        Ok(CommunityPost {
            board_id: self.board_id.clone(),
            header: format!("{} released", header),
            tags: template.tags,
            body,
        })
    }
}

/// HTML body of the announcement
fn render_body(header: &str, description: &str, summary: &str, release_link: &str) -> String {
    let summary_html: String = summary
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| format!("<p>{}</p>\n", paragraph.replace('\n', " ")))
        .collect();
    format!(
        "<h2>About the project</h2>\n<p>{}</p>\n<h2>New release</h2>\n{}<p>Find {} on <a href=\"{}\" target=\"_blank\">GitHub</a>.</p>\n",
        description.trim(),
        summary_html,
        header,
        release_link
    )
}

impl ReleaseMaker for CommunityPortalReleaseMaker {
    fn make_release(&self, repository: &dyn Repository) -> Result<String> {
        info!(repository = repository.name(), "creating community portal draft");
        let post = self.community_post(repository)?;
        self.portal.send_draft_post(&post)?;
        Ok(format!("Draft '{}' was sent to the community portal.", post.header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockPortal;
    use crate::repository::{open_repository, release_letter_path, MemorySource, CHANGELOG_PATH};

    const TEMPLATE_PATH: &str = "community_portal_post_template.json";
    const TEMPLATE: &str = r#"{
        "project name": "Virtual Schema for Exasol",
        "project description": "Access Exasol from Exasol.",
        "tags": ["Release Droid", "Virtual Schema"]
    }"#;

    fn repository(letter: &str) -> Box<dyn Repository> {
        let mut source = MemorySource::new("exasol/exasol-virtual-schema", "main");
        source.add_file(CHANGELOG_PATH, "* [2.0.0](changes_2.0.0.md)");
        source.add_file(&release_letter_path("2.0.0"), letter);
        source.add_file(TEMPLATE_PATH, TEMPLATE);
        open_repository(Box::new(source))
    }

    #[test]
    fn test_template_parsing() {
        let template = CommunityPortalTemplate::parse(TEMPLATE).unwrap();
        assert_eq!(template.project_name, "Virtual Schema for Exasol");
        assert_eq!(template.tags.len(), 2);
        assert!(CommunityPortalTemplate::parse("{}").unwrap().tags.is_empty());
    }

    #[test]
    fn test_draft_post() {
        let portal = Arc::new(MockPortal::new());
        let maker = CommunityPortalReleaseMaker::new(portal.clone(), TEMPLATE_PATH, "ProductNews");
        let letter = "# VS 2.0.0, released 2024-05-17\n\nCode name: Big\n\n## Summary\n\nNew pushdown.\n\n## Features\n* #1: x\n";

        maker.make_release(repository(letter).as_ref()).unwrap();

        let posts = portal.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].board_id, "ProductNews");
        assert_eq!(posts[0].header, "Virtual Schema for Exasol 2.0.0 released");
        assert!(posts[0].body.contains("<p>New pushdown.</p>"));
        assert!(posts[0]
            .body
            .contains("https://github.com/exasol/exasol-virtual-schema/releases/tag/2.0.0"));
    }

    #[test]
    fn test_missing_summary_fails() {
        let portal = Arc::new(MockPortal::new());
        let maker = CommunityPortalReleaseMaker::new(portal.clone(), TEMPLATE_PATH, "ProductNews");
        let letter = "# VS 2.0.0, released 2024-05-17\n\nCode name: Big\n\nno summary\n";

        let err = maker.make_release(repository(letter).as_ref()).unwrap_err();
        assert!(err.to_string().contains("Summary"));
        assert!(portal.posts().is_empty());
    }
}
