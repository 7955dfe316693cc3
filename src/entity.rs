mod install_plan;

pub use install_plan::InstallPlan;

// Re-export types from resolver-core
pub use resolver_core::{
    CandidateSet, Conflict, DependencyEdge, PackageIdentity, PlatformTag, ResolvedSet,
    SelectionPolicy, Version, VersionRange,
};
