use std::fmt;

use serde::{Deserialize, Serialize};

use super::{PackageIdentity, VersionRange};

/// A constraint from one concrete package onto another package id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: PackageIdentity,
    pub to_id: String,
    pub range: VersionRange,
}

impl DependencyEdge {
    pub fn new(from: PackageIdentity, to_id: impl Into<String>, range: VersionRange) -> Self {
        Self {
            from,
            to_id: to_id.into(),
            range,
        }
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} {}", self.from, self.to_id, self.range)
    }
}
