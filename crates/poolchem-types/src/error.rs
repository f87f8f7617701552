//! Error types for target profile parsing in poolchem-types.

use thiserror::Error;

/// Errors that can occur when parsing a stored target profile.
///
/// Stored profiles are untrusted JSON. Any of these errors means the whole
/// profile is rejected; there is no per-parameter partial acceptance.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ProfileError {
    /// The profile is not a JSON object.
    #[error("Target profile must be an object")]
    NotAnObject,

    /// A required parameter key is missing (or null).
    #[error("Target profile is missing '{0}'")]
    MissingKey(&'static str),

    /// The value for a key is neither a `[min, max]` pair nor a `{min, max}` object.
    #[error("Target '{key}' must be a [min, max] pair")]
    NotARange {
        /// The offending parameter key.
        key: &'static str,
    },

    /// A bound is not a number.
    #[error("Target '{key}' has a non-numeric bound")]
    NonNumericBound {
        /// The offending parameter key.
        key: &'static str,
    },

    /// A bound is NaN or infinite.
    #[error("Target '{key}' has a non-finite bound")]
    NonFiniteBound {
        /// The offending parameter key.
        key: &'static str,
    },

    /// The range is inverted (`min > max`).
    #[error("Target '{key}' is inverted: min {min} > max {max}")]
    InvertedRange {
        /// The offending parameter key.
        key: &'static str,
        /// Lower bound as stored.
        min: f64,
        /// Upper bound as stored.
        max: f64,
    },
}

/// Result type alias using poolchem-types' ProfileError type.
pub type ProfileResult<T> = std::result::Result<T, ProfileError>;
