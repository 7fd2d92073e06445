//! Read-only view of a repository at one branch
//!
//! A [`Repository`] is created per request from a [`ContentSource`] and is
//! never mutated afterwards except for the memoized version and release
//! letters held in its [`BranchContent`]. The variant (Git, Maven, Scala) is
//! chosen by [`open_repository`] from the build descriptor on the branch.

pub mod git;
pub mod local;
pub mod maven;
pub mod mock;
pub mod pom;
pub mod scala;
pub mod source;

pub use git::GitRepository;
pub use local::LocalSource;
pub use maven::MavenRepository;
pub use mock::MemorySource;
pub use scala::ScalaRepository;
pub use source::{ContentSource, ForgeSource};

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::domain::ReleaseLetter;
use crate::error::{ReleaseDroidError, Result};
use crate::gateway::GatewayResult;

pub const CHANGELOG_PATH: &str = "doc/changes/changelog.md";
pub const CHANGES_DIRECTORY: &str = "doc/changes";
pub const POM_PATH: &str = "pom.xml";
pub const BUILD_SBT_PATH: &str = "build.sbt";

/// Path of the release letter for `version`
pub fn release_letter_path(version: &str) -> String {
    format!("{}/changes_{}.md", CHANGES_DIRECTORY, version)
}

/// Build ecosystem of a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryKind {
    Git,
    Maven,
    Scala,
}

impl RepositoryKind {
    /// Detect the kind from the build descriptor present on the branch
    pub fn detect(source: &dyn ContentSource) -> RepositoryKind {
        if source.has_file(POM_PATH) {
            RepositoryKind::Maven
        } else if source.has_file(BUILD_SBT_PATH) {
            RepositoryKind::Scala
        } else {
            RepositoryKind::Git
        }
    }
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryKind::Git => f.write_str("Git"),
            RepositoryKind::Maven => f.write_str("Maven"),
            RepositoryKind::Scala => f.write_str("Scala"),
        }
    }
}

/// Branch content plus the caches owned by one repository instance
pub struct BranchContent {
    source: Box<dyn ContentSource>,
    version: Mutex<Option<String>>,
    release_letters: Mutex<HashMap<String, Arc<ReleaseLetter>>>,
}

impl BranchContent {
    pub fn new(source: Box<dyn ContentSource>) -> Self {
        BranchContent {
            source,
            version: Mutex::new(None),
            release_letters: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &dyn ContentSource {
        self.source.as_ref()
    }

    /// Return the cached version or compute and cache it.
    ///
    /// The lock is held while computing so concurrent first calls fetch once.
    pub fn version_with(&self, compute: impl FnOnce() -> Result<String>) -> Result<String> {
        let mut cached = self.version.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(version) = cached.as_ref() {
            return Ok(version.clone());
        }
        let version = compute()?;
        *cached = Some(version.clone());
        Ok(version)
    }

    /// Parsed release letter for `version`, read once per instance
    pub fn release_letter(&self, version: &str) -> Result<Arc<ReleaseLetter>> {
        let mut letters = self
            .release_letters
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(letter) = letters.get(version) {
            return Ok(Arc::clone(letter));
        }

        let path = release_letter_path(version);
        debug!(path = %path, "reading release letter");
        let content = self.source.read_file(&path).map_err(|e| {
            ReleaseDroidError::repository_access(
                "E-RD-REP-4",
                format!(
                    "Cannot read release letter '{}': {}. Please add the file for version {}.",
                    path, e, version
                ),
            )
        })?;
        let file_name = path.rsplit('/').next().unwrap_or(&path).to_string();
        let letter = Arc::new(ReleaseLetter::parse(file_name, &content));
        letters.insert(version.to_string(), Arc::clone(&letter));
        Ok(letter)
    }
}

/// Uniform view of a repository variant at a branch
pub trait Repository: Send + Sync {
    fn content(&self) -> &BranchContent;

    fn kind(&self) -> RepositoryKind;

    /// Variant-specific version lookup, uncached
    fn read_version(&self) -> Result<String>;

    /// Variant-specific deliverable map: asset name to path
    fn deliverables(&self) -> Result<BTreeMap<String, String>>;

    /// `owner/name`
    fn name(&self) -> &str {
        self.content().source().repository_name()
    }

    fn branch_name(&self) -> &str {
        self.content().source().branch_name()
    }

    fn read_file(&self, path: &str) -> Result<String> {
        self.content().source().read_file(path)
    }

    fn has_file(&self, path: &str) -> bool {
        self.content().source().has_file(path)
    }

    /// Current declared version, memoized
    fn version(&self) -> Result<String> {
        self.content().version_with(|| self.read_version())
    }

    fn changelog(&self) -> Result<String> {
        self.read_file(CHANGELOG_PATH)
    }

    fn release_letter(&self, version: &str) -> Result<Arc<ReleaseLetter>> {
        self.content().release_letter(version)
    }

    fn is_on_default_branch(&self) -> Result<bool> {
        self.content().source().is_on_default_branch()
    }

    fn latest_tag(&self) -> GatewayResult<Option<String>> {
        self.content().source().latest_tag()
    }
}

/// Pick the repository variant for the content found on the branch
pub fn open_repository(source: Box<dyn ContentSource>) -> Box<dyn Repository> {
    let kind = RepositoryKind::detect(source.as_ref());
    debug!(%kind, repository = source.repository_name(), branch = source.branch_name(), "opening repository");
    let content = BranchContent::new(source);
    match kind {
        RepositoryKind::Git => Box::new(GitRepository::new(content)),
        RepositoryKind::Maven => Box::new(MavenRepository::new(content)),
        RepositoryKind::Scala => Box::new(ScalaRepository::new(content)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTER: &str = "# Project 1.1.0, released 2024-03-01\n\nCode name: Fixes\n\n## Bug fixes\n* #3: broken\n";

    fn memory() -> MemorySource {
        let mut source = MemorySource::new("exasol/project", "main");
        source.add_file(CHANGELOG_PATH, "* [1.1.0](changes_1.1.0.md)\n");
        source.add_file(&release_letter_path("1.1.0"), LETTER);
        source
    }

    #[test]
    fn test_kind_detection() {
        let mut source = memory();
        assert_eq!(RepositoryKind::detect(&source), RepositoryKind::Git);
        source.add_file(BUILD_SBT_PATH, "version := \"1.0.0\"");
        assert_eq!(RepositoryKind::detect(&source), RepositoryKind::Scala);
        source.add_file(POM_PATH, "<project/>");
        assert_eq!(RepositoryKind::detect(&source), RepositoryKind::Maven);
    }

    #[test]
    fn test_version_is_memoized() {
        let source = memory();
        let reads = source.read_counter();
        let repository = open_repository(Box::new(source));
        let before = reads.get();

        assert_eq!(repository.version().unwrap(), "1.1.0");
        assert_eq!(repository.version().unwrap(), "1.1.0");
        assert_eq!(reads.get() - before, 1);
    }

    #[test]
    fn test_release_letter_is_memoized_per_version() {
        let source = memory();
        let reads = source.read_counter();
        let repository = open_repository(Box::new(source));
        let before = reads.get();

        let first = repository.release_letter("1.1.0").unwrap();
        let second = repository.release_letter("1.1.0").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.file_name(), "changes_1.1.0.md");
        assert_eq!(first.header(), Some("Fixes"));
        assert_eq!(reads.get() - before, 1);
    }

    #[test]
    fn test_missing_release_letter_is_repository_access_error() {
        let repository = open_repository(Box::new(memory()));
        let err = repository.release_letter("9.9.9").unwrap_err();
        assert!(matches!(
            err,
            ReleaseDroidError::RepositoryAccess { code: "E-RD-REP-4", .. }
        ));
    }
}
