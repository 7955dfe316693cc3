//! Error type for install planning.

use resolver_core::ResolveError;
use sparse_index::IndexError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// The registry client could not be built
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
