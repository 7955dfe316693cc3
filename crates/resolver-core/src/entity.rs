mod candidate;
mod edge;
mod identity;
mod platform;
mod policy;
mod range;
mod resolved;

pub use candidate::CandidateSet;
pub use edge::DependencyEdge;
pub use identity::PackageIdentity;
pub use platform::PlatformTag;
pub use policy::SelectionPolicy;
pub use range::{parse_version_lenient, VersionRange};
pub use resolved::ResolvedSet;
