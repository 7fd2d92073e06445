use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{ReleaseDroidError, Result};
use crate::gateway::{GatewayError, GatewayResult};
use crate::repository::ContentSource;

/// Shared view of how many files a [`MemorySource`] has served
#[derive(Debug, Clone, Default)]
pub struct ReadCounter(Arc<AtomicUsize>);

impl ReadCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// In-memory branch content for tests
pub struct MemorySource {
    repository: String,
    branch: String,
    files: HashMap<String, String>,
    on_default_branch: bool,
    latest_tag: Option<String>,
    latest_tag_error: Option<String>,
    reads: ReadCounter,
}

impl MemorySource {
    /// Content on the default branch with no prior release
    pub fn new(repository: impl Into<String>, branch: impl Into<String>) -> Self {
        MemorySource {
            repository: repository.into(),
            branch: branch.into(),
            files: HashMap::new(),
            on_default_branch: true,
            latest_tag: None,
            latest_tag_error: None,
            reads: ReadCounter::default(),
        }
    }

    pub fn add_file(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn set_on_default_branch(&mut self, on_default_branch: bool) {
        self.on_default_branch = on_default_branch;
    }

    pub fn set_latest_tag(&mut self, tag: impl Into<String>) {
        self.latest_tag = Some(tag.into());
    }

    /// Make the latest tag lookup fail with `cause`
    pub fn fail_latest_tag(&mut self, cause: impl Into<String>) {
        self.latest_tag_error = Some(cause.into());
    }

    /// Handle that keeps counting after the source moves into a repository
    pub fn read_counter(&self) -> ReadCounter {
        self.reads.clone()
    }
}

impl ContentSource for MemorySource {
    fn repository_name(&self) -> &str {
        &self.repository
    }

    fn branch_name(&self) -> &str {
        &self.branch
    }

    fn read_file(&self, path: &str) -> Result<String> {
        self.reads.0.fetch_add(1, Ordering::SeqCst);
        self.files.get(path).cloned().ok_or_else(|| {
            ReleaseDroidError::repository_access(
                "E-RD-REP-2",
                format!("File '{}' not found on branch '{}'", path, self.branch),
            )
        })
    }

    fn has_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn is_on_default_branch(&self) -> Result<bool> {
        Ok(self.on_default_branch)
    }

    fn latest_tag(&self) -> GatewayResult<Option<String>> {
        match &self.latest_tag_error {
            Some(cause) => Err(GatewayError::new("get latest release", cause.clone())),
            None => Ok(self.latest_tag.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_are_counted() {
        let mut source = MemorySource::new("o/r", "main");
        source.add_file("a.txt", "a");
        let counter = source.read_counter();

        assert_eq!(source.read_file("a.txt").unwrap(), "a");
        assert!(source.read_file("b.txt").is_err());
        assert!(source.has_file("a.txt"));
        assert_eq!(counter.get(), 2);
    }
}
