use std::collections::{BTreeMap, BTreeSet};

use semver::Version;
use serde::Serialize;

use super::PackageIdentity;

/// Every concrete version discovered per package id.
///
/// Backed by sorted collections so iteration never depends on discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateSet {
    versions: BTreeMap<String, BTreeSet<Version>>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the identity was already present.
    pub fn insert(&mut self, identity: PackageIdentity) -> bool {
        self.versions
            .entry(identity.id)
            .or_default()
            .insert(identity.version)
    }

    /// Drop every other version of `identity.id`, keeping only `identity`.
    ///
    /// Returns false (and leaves the set unchanged) if `identity` is not a candidate.
    pub fn pin(&mut self, identity: &PackageIdentity) -> bool {
        if !self.contains(identity) {
            return false;
        }
        if let Some(versions) = self.versions.get_mut(&identity.id) {
            versions.retain(|version| *version == identity.version);
        }
        true
    }

    pub fn versions(&self, id: &str) -> Option<&BTreeSet<Version>> {
        self.versions.get(id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.versions.contains_key(id)
    }

    pub fn contains(&self, identity: &PackageIdentity) -> bool {
        self.versions
            .get(&identity.id)
            .is_some_and(|versions| versions.contains(&identity.version))
    }

    /// Number of distinct package ids.
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Number of distinct (id, version) nodes.
    pub fn node_count(&self) -> usize {
        self.versions.values().map(BTreeSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<Version>)> {
        self.versions.iter()
    }

    pub fn identities(&self) -> impl Iterator<Item = PackageIdentity> + '_ {
        self.versions.iter().flat_map(|(id, versions)| {
            versions
                .iter()
                .map(move |version| PackageIdentity::new(id.clone(), version.clone()))
        })
    }
}

impl FromIterator<PackageIdentity> for CandidateSet {
    fn from_iter<T: IntoIterator<Item = PackageIdentity>>(iter: T) -> Self {
        let mut set = Self::new();
        for identity in iter {
            set.insert(identity);
        }
        set
    }
}
