//! # install-plan
//!
//! Resolve a package and its transitive dependencies into one version per
//! package for a target platform, ready to be rendered as an install script.
//!
//! ## Overview
//!
//! - **resolver-core**: graph discovery and version conflict resolution
//! - **sparse-index**: metadata client for Cargo-style sparse registries
//! - **install-plan**: configuration, logging and the [`plan_install`] entry point
//!
//! ## Example
//!
//! ```ignore
//! use install_plan::{init_logging, plan_install_from_index, PackageIdentity, PlatformTag, ResolverConfig, Version};
//!
//! init_logging();
//! let config = ResolverConfig::from_value(options);
//! let plan = plan_install_from_index(
//!     PackageIdentity::new("ripgrep", Version::new(14, 1, 0)),
//!     PlatformTag::new("x86_64-unknown-linux-gnu"),
//!     &config,
//! )
//! .await?;
//! for identity in plan.dependencies() {
//!     println!("{identity}");
//! }
//! ```

mod config;
mod entity;
mod error;
mod logging;
mod registry;
mod usecase;

pub use config::{RegistryConfig, ResolverConfig};
pub use entity::*;
pub use error::PlanError;
pub use logging::init_logging;
pub use registry::index_client;
pub use usecase::{plan_install, plan_install_from_index};

pub use resolver_core::{InMemoryMetadata, MetadataClient, ResolveError};
