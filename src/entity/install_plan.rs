use serde::Serialize;

use super::{PackageIdentity, PlatformTag, ResolvedSet, Version};

/// The resolved install set for one root on one platform.
///
/// This is the hand-off to script rendering: at most one version per package
/// id, the root always included, iteration sorted by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallPlan {
    pub root: PackageIdentity,
    pub platform: PlatformTag,
    pub packages: ResolvedSet,
}

impl InstallPlan {
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn version_of(&self, id: &str) -> Option<&Version> {
        self.packages.get(id)
    }

    /// Packages other than the root, sorted by id.
    pub fn dependencies(&self) -> impl Iterator<Item = PackageIdentity> + '_ {
        self.packages
            .identities()
            .filter(|identity| identity.id != self.root.id)
    }
}
