//! Platform release actions
//!
//! A maker runs only after validation of its platform produced no failures.
//! Its errors are recorded in the release report of that platform and never
//! stop the other requested platforms.

pub mod community;
pub mod github;
pub mod maven;

pub use community::{CommunityPortalReleaseMaker, CommunityPortalTemplate};
pub use github::GitHubReleaseMaker;
pub use maven::MavenReleaseMaker;

use crate::error::Result;
use crate::repository::Repository;

/// Publishes a validated repository on one platform
pub trait ReleaseMaker: Send + Sync {
    /// Returns a short description of what was released
    fn make_release(&self, repository: &dyn Repository) -> Result<String>;
}
