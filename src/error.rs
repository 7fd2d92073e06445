use thiserror::Error;

use crate::gateway::GatewayError;
use crate::report::ReportKind;

/// Unified error type for release-droid operations
#[derive(Error, Debug)]
pub enum ReleaseDroidError {
    #[error("{code}: {message}")]
    UserInput { code: &'static str, message: String },

    #[error("{code}: {message}")]
    RepositoryAccess { code: &'static str, message: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Release failed: {0}")]
    Release(String),

    #[error("F-RD-REP-1: Unable to merge a {left} report with a {right} report")]
    ReportMerge { left: ReportKind, right: ReportKind },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results in release-droid
pub type Result<T> = std::result::Result<T, ReleaseDroidError>;

impl ReleaseDroidError {
    /// Create a user input error with a stable code
    pub fn user_input(code: &'static str, msg: impl Into<String>) -> Self {
        ReleaseDroidError::UserInput {
            code,
            message: msg.into(),
        }
    }

    /// Create a repository access error with a stable code
    pub fn repository_access(code: &'static str, msg: impl Into<String>) -> Self {
        ReleaseDroidError::RepositoryAccess {
            code,
            message: msg.into(),
        }
    }

    /// Create a release error with context
    pub fn release(msg: impl Into<String>) -> Self {
        ReleaseDroidError::Release(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseDroidError::Config(msg.into())
    }
}
