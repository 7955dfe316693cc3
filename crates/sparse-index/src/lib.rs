//! # sparse-index
//!
//! A [`resolver_core::MetadataClient`] that reads a Cargo-style sparse
//! registry index over HTTP.
//!
//! ## Overview
//!
//! Each package has one index file (`se/rd/serde` for `serde`) holding one JSON
//! entry per published version. The client:
//! - fetches and parses the file once, then serves it from a TTL cache;
//! - maps an entry's dependencies to edges for the requested platform, skipping
//!   dev and optional dependencies and other platforms' target dependencies;
//! - lists non-yanked versions so discovery can descend into real releases.
//!
//! ## Example
//!
//! ```ignore
//! use sparse_index::{IndexOptions, SparseIndexClient, CRATES_IO_INDEX};
//!
//! let client = SparseIndexClient::new(reqwest::Client::new(), IndexOptions::new(CRATES_IO_INDEX)?);
//! let entries = client.fetch_entries("serde").await?;
//! ```

mod client;
mod entry;
mod error;
mod path;

pub use client::{
    IndexOptions, SparseIndexClient, CRATES_IO_INDEX, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL,
};
pub use entry::{parse_entries, DependencyKind, IndexDependency, IndexEntry};
pub use error::IndexError;
pub use path::index_path;
