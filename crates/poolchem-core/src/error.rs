//! Error types for poolchem-core.
//!
//! The dosing engine degrades rather than fails: absent values skip rules,
//! malformed target profiles fall back to the defaults, and an unresolved
//! reading id is treated as "no reading". Only two conditions abort a
//! recommendation request:
//!
//! | Error | Cause | Retry? |
//! |-------|-------|--------|
//! | [`Error::PoolNotFound`] | Pool does not exist in the caller's organization | No |
//! | [`Error::Storage`] | The pool directory failed (not merely "absent") | Caller's choice |
//!
//! [`Error::InvalidReading`] comes from
//! [`ValidationResult::into_result`](crate::ValidationResult::into_result),
//! which callers run before storing or dosing. The engine itself never
//! raises it.

use thiserror::Error;

/// Errors that can occur while computing dosing recommendations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The pool does not exist in the caller's organization.
    #[error("Pool not found: {0}")]
    PoolNotFound(String),

    /// The pool directory failed to answer a lookup.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A reading failed plausibility validation.
    #[error("Invalid reading: {0}")]
    InvalidReading(String),
}

impl Error {
    /// Wrap any displayable storage failure.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Error::Storage(err.to_string())
    }
}

/// Result type alias using poolchem-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
