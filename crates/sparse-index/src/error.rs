//! Error types for sparse-index.

use thiserror::Error;

/// Errors that can occur while fetching or interpreting index files.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Transport failure or unreadable response body
    #[error("index request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The registry answered with a non-success status other than not-found
    #[error("index returned status {status} for '{name}'")]
    Status { name: String, status: u16 },

    /// The registry does not know the package (404 or 410)
    #[error("index has no package '{0}'")]
    NotFound(String),

    /// The name cannot be a registry package name
    #[error("invalid package name '{0}'")]
    InvalidName(String),

    /// The index URL could not be joined with a package path
    #[error("invalid index url: {0}")]
    Url(#[from] url::ParseError),

    /// An entry carries a version that is not valid semver
    #[error("invalid version '{version}' in index entry for '{name}'")]
    InvalidVersion { name: String, version: String },

    /// A dependency requirement could not be parsed or converted to a range
    #[error("invalid requirement '{req}' on '{dependency}': {reason}")]
    InvalidRequirement {
        dependency: String,
        req: String,
        reason: String,
    },
}

impl IndexError {
    pub(crate) fn requirement(dependency: &str, req: &str, reason: impl ToString) -> Self {
        IndexError::InvalidRequirement {
            dependency: dependency.to_string(),
            req: req.to_string(),
            reason: reason.to_string(),
        }
    }
}

