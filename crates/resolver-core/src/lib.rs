//! # resolver-core
//!
//! Discover a package's dependency graph and collapse it into one version per
//! package.
//!
//! ## Overview
//!
//! Resolution runs in two steps:
//! - **discover**: walk every (id, version) node reachable from a root on one
//!   platform, asking a [`MetadataClient`] for each node's edges exactly once.
//! - **resolve**: for every package id, keep the candidate versions that satisfy
//!   every edge onto that id and pick one by [`SelectionPolicy`].
//!
//! The metadata source is a trait so the engine can run against a registry
//! (see the `sparse-index` crate) or an in-memory graph.
//!
//! ## Example
//!
//! ```ignore
//! use resolver_core::{resolve, Discoverer, InMemoryMetadata, PlatformTag, SelectionPolicy};
//!
//! let platform = PlatformTag::new("x86_64-unknown-linux-gnu");
//! let discovery = Discoverer::new(&metadata, &platform)
//!     .max_concurrent(8)
//!     .discover(root.clone())
//!     .await?;
//! let resolved = resolve(
//!     &discovery.candidates,
//!     &discovery.edges,
//!     &root.id,
//!     SelectionPolicy::Highest,
//! )?;
//! for (id, version) in resolved.iter() {
//!     println!("{id} {version}");
//! }
//! ```
//!
//! ## Complexity
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `discover()` | O(nodes + edges) lookups, each node once |
//! | `resolve()` | O(candidates × incoming edges) |

mod discover;
mod entity;
mod error;
mod metadata;
mod resolve;

pub use discover::{Discoverer, Discovery, DEFAULT_MAX_CONCURRENT};
pub use entity::{
    parse_version_lenient, CandidateSet, DependencyEdge, PackageIdentity, PlatformTag,
    ResolvedSet, SelectionPolicy, VersionRange,
};
pub use error::{Conflict, RangeError, ResolveError};
pub use metadata::{InMemoryMetadata, MetadataClient};
pub use resolve::resolve;

pub use semver::Version;
