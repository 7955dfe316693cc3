//! Error types for resolver-core.

use std::fmt;

use semver::Version;
use thiserror::Error;

use crate::entity::{DependencyEdge, PackageIdentity, PlatformTag};

/// Errors that abort a resolution request. None of them are retried.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The metadata client had no data for a node reached during discovery
    #[error("package {identity} not found for platform '{platform}'")]
    PackageNotFound {
        identity: PackageIdentity,
        platform: PlatformTag,
    },

    /// Discovery succeeded but some package ids have no acceptable version.
    /// Every offending id is reported, sorted by id.
    #[error("unsatisfiable constraints: {}", format_conflicts(.0))]
    UnsatisfiableConstraint(Vec<Conflict>),

    /// The root id was not among the candidates handed to the resolver
    #[error("root package '{0}' is missing from the candidate set")]
    RootMissing(String),
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::PackageNotFound { .. })
    }

    /// Ids that could not be satisfied, empty for other kinds of error.
    pub fn unsatisfiable_ids(&self) -> Vec<&str> {
        match self {
            ResolveError::UnsatisfiableConstraint(conflicts) => {
                conflicts.iter().map(|c| c.id.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// One package id for which no candidate version satisfies all incoming edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub id: String,
    /// Every version discovered for the id
    pub candidates: Vec<Version>,
    /// The edges that target the id, i.e. who asked for what
    pub constraints: Vec<DependencyEdge>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let candidates: Vec<String> = self.candidates.iter().map(|v| v.to_string()).collect();
        let requirers: Vec<String> = self
            .constraints
            .iter()
            .map(|edge| format!("{} by {}", edge.range, edge.from))
            .collect();
        write!(
            f,
            "{} (candidates: {}; required {})",
            self.id,
            candidates.join(", "),
            requirers.join(", ")
        )
    }
}

fn format_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from parsing versions and ranges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid version '{0}'")]
    InvalidVersion(String),

    #[error("invalid version range '{0}'")]
    InvalidRange(String),

    #[error("unsupported version requirement '{0}'")]
    UnsupportedComparator(String),
}
