//! Error types for the calmate ecosystem.

use thiserror::Error;

/// Errors that can occur in calmate operations.
///
/// None of these are fatal: auth and ownership errors surface to the
/// caller, store errors are logged at the call site and the application
/// stays interactive.
#[derive(Error, Debug)]
pub enum CalmateError {
    #[error("Not signed in: {0}")]
    NotSignedIn(String),

    #[error("Only the owner may modify event '{0}'")]
    NotOwner(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("End must be after start")]
    InvalidSpan,

    #[error("Store error: {0}")]
    Store(String),
}

/// Result type alias for calmate operations.
pub type CalmateResult<T> = Result<T, CalmateError>;
