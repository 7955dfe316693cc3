//! Graph discovery: walk every reachable (id, version) node exactly once.

use std::collections::BTreeSet;

use dashmap::{DashMap, DashSet};
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use semver::Version;
use tracing::{debug, trace, warn};

use crate::entity::{CandidateSet, DependencyEdge, PackageIdentity, PlatformTag};
use crate::error::ResolveError;
use crate::metadata::MetadataClient;

/// Default number of metadata lookups allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 16;

/// Everything discovery learned about the graph below one root.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub candidates: CandidateSet,
    /// Sorted and deduplicated
    pub edges: Vec<DependencyEdge>,
}

impl Discovery {
    /// Number of distinct nodes visited (and looked up exactly once each).
    pub fn visited(&self) -> usize {
        self.candidates.node_count()
    }
}

/// Walks the dependency graph below a root identity on one platform.
///
/// Pending nodes sit on an explicit stack, so with `max_concurrent(1)` the
/// walk is a plain depth-first traversal. Higher limits fan out lookups
/// without changing the result.
pub struct Discoverer<'a, C: ?Sized> {
    client: &'a C,
    platform: &'a PlatformTag,
    max_concurrent: usize,
}

/// A looked-up node with the nodes its edges lead to.
struct Expanded {
    identity: PackageIdentity,
    children: Vec<(DependencyEdge, PackageIdentity)>,
}

/// Accumulators shared by every lookup of one discovery run.
#[derive(Default)]
struct DiscoveryState {
    visited: DashSet<PackageIdentity>,
    candidates: DashMap<String, BTreeSet<Version>>,
    edges: Mutex<Vec<DependencyEdge>>,
}

impl DiscoveryState {
    /// Atomic check-and-insert. Returns false if the node was already claimed.
    fn claim(&self, identity: &PackageIdentity) -> bool {
        if !self.visited.insert(identity.clone()) {
            return false;
        }
        self.candidates
            .entry(identity.id.clone())
            .or_default()
            .insert(identity.version.clone());
        true
    }

    fn record_edge(&self, edge: DependencyEdge) {
        self.edges.lock().push(edge);
    }

    fn finish(self) -> Discovery {
        let candidates = self
            .candidates
            .into_iter()
            .flat_map(|(id, versions)| {
                versions
                    .into_iter()
                    .map(move |version| PackageIdentity::new(id.clone(), version))
            })
            .collect();
        let mut edges = self.edges.into_inner();
        edges.sort();
        edges.dedup();
        Discovery { candidates, edges }
    }
}

impl<'a, C: MetadataClient + ?Sized> Discoverer<'a, C> {
    pub fn new(client: &'a C, platform: &'a PlatformTag) -> Self {
        Self {
            client,
            platform,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Limit the number of lookups in flight. Zero is treated as one.
    pub fn max_concurrent(mut self, limit: usize) -> Self {
        self.max_concurrent = limit.max(1);
        self
    }

    /// Visit every node reachable from `root`.
    ///
    /// Fails with `PackageNotFound` on the first node the metadata client
    /// cannot resolve; lookups still in flight at that point are dropped.
    #[tracing::instrument(
        name = "discover",
        level = "debug",
        skip(self),
        fields(platform = %self.platform)
    )]
    pub async fn discover(&self, root: PackageIdentity) -> Result<Discovery, ResolveError> {
        let state = DiscoveryState::default();
        let mut pending = vec![root];
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.max_concurrent {
                let Some(identity) = pending.pop() else {
                    break;
                };
                if !state.claim(&identity) {
                    trace!("already visited {}", identity);
                    continue;
                }
                in_flight.push(self.expand(identity));
            }

            let Some(expanded) = in_flight.next().await else {
                break;
            };
            let Expanded { identity, children } = expanded?;
            trace!("{} has {} dependencies", identity, children.len());

            // Reversed so the first declared dependency is popped first.
            for (edge, child) in children.into_iter().rev() {
                state.record_edge(edge);
                pending.push(child);
            }
        }

        let discovery = state.finish();
        debug!(
            "discovery visited {} nodes across {} packages, {} edges",
            discovery.visited(),
            discovery.candidates.len(),
            discovery.edges.len()
        );
        Ok(discovery)
    }

    async fn expand(&self, identity: PackageIdentity) -> Result<Expanded, ResolveError> {
        let Some(edges) = self
            .client
            .resolve_dependencies(&identity, self.platform)
            .await
        else {
            warn!("no metadata for {} on '{}'", identity, self.platform);
            return Err(ResolveError::PackageNotFound {
                identity,
                platform: self.platform.clone(),
            });
        };

        let mut children = Vec::with_capacity(edges.len());
        for edge in edges {
            let version = self.descend_version(&edge).await;
            let child = PackageIdentity::new(edge.to_id.clone(), version);
            children.push((edge, child));
        }
        Ok(Expanded { identity, children })
    }

    /// The version to visit for an edge: the lowest one its range admits.
    async fn descend_version(&self, edge: &DependencyEdge) -> Version {
        if let Some(published) = self
            .client
            .available_versions(&edge.to_id, self.platform)
            .await
        {
            if let Some(lowest) = published.into_iter().filter(|v| edge.range.contains(v)).min() {
                return lowest;
            }
            debug!(
                "no published version of {} within {}, using the lower bound",
                edge.to_id, edge.range
            );
        }
        edge.range.lowest_candidate()
    }
}
