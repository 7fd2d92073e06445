use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ReleaseDroidError, Result};
use crate::repository::{BranchContent, Repository, RepositoryKind};

const CHANGELOG_LINK_PATTERN: &str = r"\[(\d+\.\d+\.\d+)\]\(changes_(\d+\.\d+\.\d+)\.md\)";

fn changelog_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CHANGELOG_LINK_PATTERN).expect("changelog link pattern is valid"))
}

/// Version of the first well-formed `[x.y.z](changes_x.y.z.md)` link
pub fn first_changelog_version(changelog: &str) -> Option<String> {
    changelog_link_regex()
        .captures_iter(changelog)
        .find(|caps| caps[1] == caps[2])
        .map(|caps| caps[1].to_string())
}

/// Plain git project without a build descriptor.
///
/// The version is taken from the newest changelog entry; there are no deliverables.
pub struct GitRepository {
    content: BranchContent,
}

impl GitRepository {
    pub fn new(content: BranchContent) -> Self {
        GitRepository { content }
    }
}

impl Repository for GitRepository {
    fn content(&self) -> &BranchContent {
        &self.content
    }

    fn kind(&self) -> RepositoryKind {
        RepositoryKind::Git
    }

    fn read_version(&self) -> Result<String> {
        let changelog = self.changelog()?;
        first_changelog_version(&changelog).ok_or_else(|| {
            ReleaseDroidError::repository_access(
                "E-RD-REP-3",
                "Cannot detect the project version: the changelog has no '[x.y.z](changes_x.y.z.md)' entry. \
                 Please add a link to the release letter of the new version.",
            )
        })
    }

    fn deliverables(&self) -> Result<BTreeMap<String, String>> {
        Ok(BTreeMap::new())
    }
}
