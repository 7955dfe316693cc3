//! Index file entries and their mapping onto dependency edges.

use resolver_core::{DependencyEdge, PackageIdentity, PlatformTag, Version, VersionRange};
use semver::VersionReq;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::IndexError;

/// One line of an index file: a single published version of a package.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    pub vers: String,
    #[serde(default)]
    pub deps: Vec<IndexDependency>,
    #[serde(default)]
    pub yanked: bool,
}

/// A dependency as declared in an index entry.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IndexDependency {
    /// Name as written in the dependent's manifest (may be a rename)
    pub name: String,
    pub req: String,
    #[serde(default)]
    pub optional: bool,
    /// Target triple or `cfg(...)` expression restricting the dependency
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub kind: DependencyKind,
    /// Real package name when `name` is a rename
    #[serde(default)]
    pub package: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    #[default]
    Normal,
    Build,
    Dev,
}

impl IndexDependency {
    /// The package this dependency points at.
    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or(&self.name)
    }

    /// Whether installing the dependent on `platform` needs this dependency.
    ///
    /// Dev and optional dependencies never do. A target-specific dependency
    /// applies only when its target string equals the platform tag.
    pub fn applies_to(&self, platform: &PlatformTag) -> bool {
        if self.kind == DependencyKind::Dev || self.optional {
            return false;
        }
        match &self.target {
            Some(target) => target == platform.as_str(),
            None => true,
        }
    }
}

impl IndexEntry {
    pub fn version(&self) -> Result<Version, IndexError> {
        Version::parse(&self.vers).map_err(|_| IndexError::InvalidVersion {
            name: self.name.clone(),
            version: self.vers.clone(),
        })
    }

    pub fn identity(&self) -> Result<PackageIdentity, IndexError> {
        Ok(PackageIdentity::new(self.name.clone(), self.version()?))
    }

    /// Edges this version contributes on `platform`.
    pub fn dependency_edges(&self, platform: &PlatformTag) -> Result<Vec<DependencyEdge>, IndexError> {
        let from = self.identity()?;
        let mut edges = Vec::with_capacity(self.deps.len());
        for dep in &self.deps {
            if !dep.applies_to(platform) {
                trace!("skipping {} of {} on '{}'", dep.name, from, platform);
                continue;
            }
            let req = VersionReq::parse(&dep.req)
                .map_err(|e| IndexError::requirement(&dep.name, &dep.req, e))?;
            let range = VersionRange::try_from(&req)
                .map_err(|e| IndexError::requirement(&dep.name, &dep.req, e))?;
            edges.push(DependencyEdge::new(from.clone(), dep.package_name(), range));
        }
        Ok(edges)
    }
}

/// Parse an index file: one JSON entry per line, oldest version first.
///
/// Lines that fail to parse are skipped.
pub fn parse_entries(text: &str) -> Vec<IndexEntry> {
    let mut entries = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<IndexEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                debug!("Failed to parse index line: {}", e);
            }
        }
    }
    entries
}
