use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

/// A concrete package node: one version of one package id.
///
/// Two identities with the same id and different versions are distinct graph
/// nodes but the same logical package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageIdentity {
    pub id: String,
    pub version: Version,
}

impl PackageIdentity {
    pub fn new(id: impl Into<String>, version: Version) -> Self {
        Self {
            id: id.into(),
            version,
        }
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}
