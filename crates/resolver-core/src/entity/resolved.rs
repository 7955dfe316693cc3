use std::collections::BTreeMap;

use semver::Version;
use serde::{Deserialize, Serialize};

use super::{DependencyEdge, PackageIdentity};

/// Exactly one chosen version per package id, sorted by id.
///
/// This is what gets handed to the install-script renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedSet {
    packages: BTreeMap<String, Version>,
}

impl ResolvedSet {
    pub(crate) fn from_map(packages: BTreeMap<String, Version>) -> Self {
        Self { packages }
    }

    pub fn get(&self, id: &str) -> Option<&Version> {
        self.packages.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.packages.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Version)> {
        self.packages.iter()
    }

    pub fn identities(&self) -> impl Iterator<Item = PackageIdentity> + '_ {
        self.packages
            .iter()
            .map(|(id, version)| PackageIdentity::new(id.clone(), version.clone()))
    }

    /// Edges whose target was chosen at a version outside the edge's range.
    ///
    /// Edges onto ids that are not in the set are ignored.
    pub fn violations<'a>(&self, edges: &'a [DependencyEdge]) -> Vec<&'a DependencyEdge> {
        edges
            .iter()
            .filter(|edge| {
                self.packages
                    .get(&edge.to_id)
                    .is_some_and(|version| !edge.range.contains(version))
            })
            .collect()
    }
}
