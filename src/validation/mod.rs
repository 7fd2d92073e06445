//! Readiness checks run before a release
//!
//! Structure validators apply to every repository regardless of the requested
//! platforms; platform validators add the checks of one publish target. Each
//! validator turns repository content into a [`Report`]. Repository access
//! errors propagate and abort the request, gateway failures become failed
//! results.

pub mod community;
pub mod github;
pub mod maven;
pub mod structure;
pub mod tickets;

pub use community::CommunityPlatformValidator;
pub use github::GitHubPlatformValidator;
pub use maven::MavenPlatformValidator;
pub use structure::StructureValidator;
pub use tickets::TicketValidator;

use crate::error::Result;
use crate::report::Report;
use crate::repository::Repository;

/// One group of checks producing a validation report
pub trait RepositoryValidator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn validate(&self, repository: &dyn Repository) -> Result<Report>;
}
