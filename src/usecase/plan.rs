//! Install planning: discovery followed by resolution, for one request.

use resolver_core::{resolve, Discoverer, MetadataClient, PackageIdentity, PlatformTag, ResolveError};
use tracing::{debug, info};

use crate::config::ResolverConfig;
use crate::entity::InstallPlan;
use crate::error::PlanError;
use crate::registry::index_client;

/// Resolve `root` and everything it needs on `platform` into an install plan.
///
/// The root is pinned to the requested version: if a cycle pulls in another
/// version of the root and constrains the root onto it, the request fails with
/// `UnsatisfiableConstraint` naming the root.
#[tracing::instrument(
    name = "plan_install",
    level = "info",
    skip_all,
    fields(root = %root, platform = %platform)
)]
pub async fn plan_install<C: MetadataClient + ?Sized>(
    client: &C,
    root: PackageIdentity,
    platform: PlatformTag,
    config: &ResolverConfig,
) -> Result<InstallPlan, ResolveError> {
    let discovery = Discoverer::new(client, &platform)
        .max_concurrent(config.max_concurrent_lookups)
        .discover(root.clone())
        .await?;
    info!(
        nodes = discovery.visited(),
        packages = discovery.candidates.len(),
        edges = discovery.edges.len(),
        "discovery complete"
    );

    let mut candidates = discovery.candidates;
    if !candidates.pin(&root) {
        return Err(ResolveError::RootMissing(root.id));
    }

    let packages = resolve(&candidates, &discovery.edges, &root.id, config.policy)?;
    info!(packages = packages.len(), "resolution complete");

    Ok(InstallPlan {
        root,
        platform,
        packages,
    })
}

/// [`plan_install`] against the sparse index named in `config.registry`.
pub async fn plan_install_from_index(
    root: PackageIdentity,
    platform: PlatformTag,
    config: &ResolverConfig,
) -> Result<InstallPlan, PlanError> {
    let client = index_client(&config.registry)?;
    debug!("planning {} against {}", root, client.index_url());
    Ok(plan_install(&client, root, platform, config).await?)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use resolver_core::{
        parse_version_lenient, InMemoryMetadata, SelectionPolicy, Version, VersionRange,
    };

    use super::*;

    fn id(name: &str, version: &str) -> PackageIdentity {
        PackageIdentity::new(name, parse_version_lenient(version).unwrap())
    }

    fn range(text: &str) -> VersionRange {
        text.parse().unwrap()
    }

    fn no_deps() -> Vec<(String, VersionRange)> {
        Vec::new()
    }

    fn config(policy: SelectionPolicy, max_concurrent_lookups: usize) -> ResolverConfig {
        ResolverConfig {
            policy,
            max_concurrent_lookups,
            ..Default::default()
        }
    }

    /// Two subtrees asking for overlapping ranges of `json`.
    fn web_app() -> InMemoryMetadata {
        InMemoryMetadata::new()
            .with_package(
                id("web", "1.0"),
                [("http", range("[2.0, 3.0)")), ("json", range("[1.0, 2.0)"))],
            )
            .with_package(id("http", "2.0"), [("json", range("[1.2, 2.0)"))])
            .with_package(id("json", "1.0"), no_deps())
            .with_package(id("json", "1.2"), [("itoa", range("[1.0, 2.0)"))])
            .with_package(id("itoa", "1.0"), no_deps())
    }

    const PACKAGES: u64 = 8;
    const MINORS: u64 = 4;

    /// One optional `(low, span)` edge per (package, minor, target) slot.
    fn edge_slots() -> impl Strategy<Value = Vec<Option<(u64, u64)>>> {
        prop::collection::vec(
            prop::option::weighted(0.33, (0..MINORS, 1..=MINORS)),
            (PACKAGES * MINORS * PACKAGES) as usize,
        )
    }

    /// Packages p0..p7 with versions 1.0..1.3; p_i only depends on p_j for j > i.
    fn graph(slots: &[Option<(u64, u64)>]) -> InMemoryMetadata {
        let mut metadata = InMemoryMetadata::new().with_version_listing();
        for package in 0..PACKAGES {
            for minor in 0..MINORS {
                let deps = ((package + 1)..PACKAGES).filter_map(|target| {
                    let slot = (package * MINORS + minor) * PACKAGES + target;
                    slots[slot as usize].map(|(low, span)| {
                        let high = (low + span).min(MINORS);
                        (
                            format!("p{target}"),
                            VersionRange::between(Version::new(1, low, 0), Version::new(1, high, 0)),
                        )
                    })
                });
                metadata.insert(
                    PackageIdentity::new(format!("p{package}"), Version::new(1, minor, 0)),
                    deps,
                );
            }
        }
        metadata
    }

    #[tokio::test]
    async fn test_shared_dependency_resolves_to_one_version() {
        let metadata = web_app();

        let plan = plan_install(
            &metadata,
            id("web", "1.0"),
            PlatformTag::new("linux-x64"),
            &ResolverConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(plan.len(), 4);
        assert_eq!(plan.version_of("web").unwrap().to_string(), "1.0.0");
        assert_eq!(plan.version_of("json").unwrap().to_string(), "1.2.0");
        assert_eq!(plan.version_of("itoa").unwrap().to_string(), "1.0.0");
        let dependencies: Vec<String> = plan.dependencies().map(|d| d.to_string()).collect();
        assert_eq!(dependencies, vec!["http 2.0.0", "itoa 1.0.0", "json 1.2.0"]);
    }

    #[tokio::test]
    async fn test_lowest_policy_still_honors_every_constraint() {
        let metadata = web_app();

        let plan = plan_install(
            &metadata,
            id("web", "1.0"),
            PlatformTag::new("linux-x64"),
            &config(SelectionPolicy::Lowest, 1),
        )
        .await
        .unwrap();

        // json 1.0 was discovered but http requires >= 1.2
        assert_eq!(plan.version_of("json").unwrap().to_string(), "1.2.0");
    }

    #[tokio::test]
    async fn test_conflicting_subtrees_fail_naming_the_package() {
        let metadata = InMemoryMetadata::new()
            .with_package(id("app", "1.0"), [("a", range("1.0")), ("c", range("1.0"))])
            .with_package(id("a", "1.0"), [("b", range("[1.0, 2.0)"))])
            .with_package(id("c", "1.0"), [("b", range("[3.0, 4.0)"))])
            .with_package(id("b", "1.0"), no_deps())
            .with_package(id("b", "3.0"), no_deps());

        let err = plan_install(
            &metadata,
            id("app", "1.0"),
            PlatformTag::new("any"),
            &ResolverConfig::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.unsatisfiable_ids(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_unknown_root_fails_after_one_lookup() {
        let metadata = web_app();

        let err = plan_install(
            &metadata,
            id("mobile", "1.0"),
            PlatformTag::new("any"),
            &ResolverConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(metadata.total_lookups(), 1);
        assert_eq!(metadata.looked_up(), vec![id("mobile", "1.0")]);
    }

    #[tokio::test]
    async fn test_cycle_demanding_another_root_version_is_a_conflict() {
        let metadata = InMemoryMetadata::new()
            .with_package(id("tool", "1.0"), [("plugin", range("1.0"))])
            .with_package(id("plugin", "1.0"), [("tool", range("[2.0, 3.0)"))])
            .with_package(id("tool", "2.0"), no_deps());

        let err = plan_install(
            &metadata,
            id("tool", "1.0"),
            PlatformTag::new("any"),
            &ResolverConfig::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.unsatisfiable_ids(), vec!["tool"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_generated_graphs_hold_resolution_invariants(slots in edge_slots()) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let platform = PlatformTag::new("any");
                let root = PackageIdentity::new("p0", Version::new(1, 0, 0));

                let metadata = graph(&slots);
                let discovery = Discoverer::new(&metadata, &platform)
                    .discover(root.clone())
                    .await
                    .unwrap();
                for node in metadata.looked_up() {
                    prop_assert_eq!(metadata.lookup_count(&node), 1, "node {}", node);
                }

                let first = plan_install(
                    &graph(&slots),
                    root.clone(),
                    platform.clone(),
                    &config(SelectionPolicy::Highest, 1),
                )
                .await;
                let second = plan_install(
                    &graph(&slots),
                    root.clone(),
                    platform.clone(),
                    &config(SelectionPolicy::Highest, 8),
                )
                .await;

                match (first, second) {
                    (Ok(first), Ok(second)) => {
                        prop_assert_eq!(&first, &second);
                        prop_assert_eq!(first.version_of("p0"), Some(&root.version));
                        prop_assert!(first.packages.violations(&discovery.edges).is_empty());
                        for (package, _) in discovery.candidates.iter() {
                            prop_assert!(first.packages.contains(package), "missing {}", package);
                        }
                    }
                    (Err(first), Err(second)) => {
                        prop_assert_eq!(first.unsatisfiable_ids(), second.unsatisfiable_ids());
                        prop_assert!(!first.unsatisfiable_ids().is_empty(), "{}", first);
                    }
                    (first, second) => {
                        return Err(TestCaseError::fail(format!(
                            "diverging outcomes {first:?} vs {second:?}"
                        )));
                    }
                }
                Ok(())
            })?;
        }
    }

    #[tokio::test]
    async fn test_plan_serializes_for_rendering() {
        let metadata = web_app();

        let plan = plan_install(
            &metadata,
            id("web", "1.0"),
            PlatformTag::new("linux-x64"),
            &ResolverConfig::default(),
        )
        .await
        .unwrap();

        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["platform"], "linux-x64");
        assert_eq!(value["root"]["id"], "web");
        assert_eq!(value["packages"]["json"], "1.2.0");
    }
}
