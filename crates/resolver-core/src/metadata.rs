//! The metadata source seam and an in-memory implementation of it.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use semver::Version;

use crate::entity::{DependencyEdge, PackageIdentity, PlatformTag, VersionRange};

/// Answers "what does this exact package version depend on, on this platform?".
///
/// Implementations are handed to the discoverer explicitly; the engine keeps
/// no global handle to a registry.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Direct dependency edges outgoing from `identity`.
    ///
    /// `None` is the only not-found signal; there is no separate error channel.
    async fn resolve_dependencies(
        &self,
        identity: &PackageIdentity,
        platform: &PlatformTag,
    ) -> Option<Vec<DependencyEdge>>;

    /// Published versions of `id`, if the source can list them.
    ///
    /// Discovery uses the listing to descend into the lowest published version
    /// inside a range instead of the range's lower bound.
    async fn available_versions(&self, _id: &str, _platform: &PlatformTag) -> Option<Vec<Version>> {
        None
    }
}

#[async_trait]
impl<T: MetadataClient + ?Sized> MetadataClient for Arc<T> {
    async fn resolve_dependencies(
        &self,
        identity: &PackageIdentity,
        platform: &PlatformTag,
    ) -> Option<Vec<DependencyEdge>> {
        (**self).resolve_dependencies(identity, platform).await
    }

    async fn available_versions(&self, id: &str, platform: &PlatformTag) -> Option<Vec<Version>> {
        (**self).available_versions(id, platform).await
    }
}

/// A map-backed metadata source that records every lookup.
///
/// Useful for tests and for callers that already hold the whole graph.
#[derive(Debug, Default)]
pub struct InMemoryMetadata {
    packages: HashMap<PackageIdentity, Vec<DependencyEdge>>,
    /// Empty means every platform is supported
    platforms: HashSet<PlatformTag>,
    list_versions: bool,
    lookups: Mutex<BTreeMap<PackageIdentity, usize>>,
}

impl InMemoryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package version and its dependencies as `(to_id, range)` pairs.
    pub fn with_package<I, S>(mut self, identity: PackageIdentity, dependencies: I) -> Self
    where
        I: IntoIterator<Item = (S, VersionRange)>,
        S: Into<String>,
    {
        self.insert(identity, dependencies);
        self
    }

    pub fn insert<I, S>(&mut self, identity: PackageIdentity, dependencies: I)
    where
        I: IntoIterator<Item = (S, VersionRange)>,
        S: Into<String>,
    {
        let edges = dependencies
            .into_iter()
            .map(|(to_id, range)| DependencyEdge::new(identity.clone(), to_id, range))
            .collect();
        self.packages.insert(identity, edges);
    }

    /// Only answer lookups for the given platform (may be called repeatedly).
    pub fn with_platform(mut self, platform: impl Into<PlatformTag>) -> Self {
        self.platforms.insert(platform.into());
        self
    }

    /// Answer `available_versions` from the registered packages.
    pub fn with_version_listing(mut self) -> Self {
        self.list_versions = true;
        self
    }

    /// How many times `resolve_dependencies` was called for `identity`.
    pub fn lookup_count(&self, identity: &PackageIdentity) -> usize {
        self.lookups.lock().get(identity).copied().unwrap_or(0)
    }

    pub fn total_lookups(&self) -> usize {
        self.lookups.lock().values().sum()
    }

    /// Every identity looked up at least once, sorted.
    pub fn looked_up(&self) -> Vec<PackageIdentity> {
        self.lookups.lock().keys().cloned().collect()
    }

    fn supports(&self, platform: &PlatformTag) -> bool {
        self.platforms.is_empty() || self.platforms.contains(platform)
    }
}

#[async_trait]
impl MetadataClient for InMemoryMetadata {
    async fn resolve_dependencies(
        &self,
        identity: &PackageIdentity,
        platform: &PlatformTag,
    ) -> Option<Vec<DependencyEdge>> {
        *self.lookups.lock().entry(identity.clone()).or_default() += 1;
        if !self.supports(platform) {
            return None;
        }
        self.packages.get(identity).cloned()
    }

    async fn available_versions(&self, id: &str, platform: &PlatformTag) -> Option<Vec<Version>> {
        if !self.list_versions || !self.supports(platform) {
            return None;
        }
        let mut versions: Vec<Version> = self
            .packages
            .keys()
            .filter(|identity| identity.id == id)
            .map(|identity| identity.version.clone())
            .collect();
        versions.sort();
        Some(versions)
    }
}
