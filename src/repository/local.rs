use std::fs;
use std::path::{Path, PathBuf};

use git2::Repository as Git2Repo;
use semver::Version as SemVer;
use tracing::debug;

use crate::error::{ReleaseDroidError, Result};
use crate::gateway::GatewayResult;
use crate::repository::ContentSource;

/// Working tree of a local git checkout.
///
/// A local checkout has no default branch, so it never counts as being on one.
/// Branch name and latest tag are read once when the source is opened.
pub struct LocalSource {
    root: PathBuf,
    repository: String,
    branch: String,
    latest_tag: Option<String>,
}

impl LocalSource {
    /// Open the checkout at `path`; `repository` is the `owner/name` it belongs to
    pub fn open<P: AsRef<Path>>(path: P, repository: impl Into<String>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let repo = Git2Repo::open(&root).map_err(|e| {
            ReleaseDroidError::repository_access(
                "E-RD-REP-6",
                format!(
                    "Cannot open a git repository at '{}': {}. Please check the local path.",
                    root.display(),
                    e.message()
                ),
            )
        })?;

        let branch = current_branch(&repo)?;
        let latest_tag = latest_semver_tag(&repo)?;
        debug!(path = %root.display(), branch = %branch, ?latest_tag, "opened local repository");

        Ok(LocalSource {
            root,
            repository: repository.into(),
            branch,
            latest_tag,
        })
    }
}

fn current_branch(repo: &Git2Repo) -> Result<String> {
    let head = repo.head().map_err(|e| {
        ReleaseDroidError::repository_access(
            "E-RD-REP-6",
            format!("Cannot retrieve the name of the local git branch: {}", e.message()),
        )
    })?;
    head.shorthand().map(str::to_string).ok_or_else(|| {
        ReleaseDroidError::repository_access(
            "E-RD-REP-6",
            "Cannot retrieve the name of the local git branch: HEAD is not valid UTF-8",
        )
    })
}

/// Greatest tag that reads as `x.y.z` or `vx.y.z`
fn latest_semver_tag(repo: &Git2Repo) -> Result<Option<String>> {
    let tags = repo.tag_names(None).map_err(|e| {
        ReleaseDroidError::repository_access(
            "E-RD-REP-6",
            format!("Cannot list the tags of the local repository: {}", e.message()),
        )
    })?;
    let latest = tags
        .iter()
        .flatten()
        .filter_map(|name| {
            let clean = name.trim_start_matches('v').trim_start_matches('V');
            SemVer::parse(clean)
                .ok()
                .filter(|v| v.pre.is_empty())
                .map(|v| (v, name.to_string()))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, name)| name);
    Ok(latest)
}

impl ContentSource for LocalSource {
    fn repository_name(&self) -> &str {
        &self.repository
    }

    fn branch_name(&self) -> &str {
        &self.branch
    }

    fn read_file(&self, path: &str) -> Result<String> {
        let full_path = self.root.join(path);
        fs::read_to_string(&full_path).map_err(|e| {
            ReleaseDroidError::repository_access(
                "E-RD-REP-1",
                format!(
                    "Cannot read a file from the local repository: '{}' ({}). Please check that the file exists and the local path is correct.",
                    full_path.display(),
                    e
                ),
            )
        })
    }

    fn has_file(&self, path: &str) -> bool {
        self.root.join(path).is_file()
    }

    fn is_on_default_branch(&self) -> Result<bool> {
        Ok(false)
    }

    fn latest_tag(&self) -> GatewayResult<Option<String>> {
        Ok(self.latest_tag.clone())
    }
}
