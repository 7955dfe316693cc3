//! Version resolution: one version per package id, satisfying every edge onto it.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::entity::{CandidateSet, DependencyEdge, ResolvedSet, SelectionPolicy};
use crate::error::{Conflict, ResolveError};

/// Pick one version per id in `candidates`.
///
/// A version survives when it lies inside every edge whose `to_id` is its id;
/// an id with no incoming edges keeps all of its versions. `policy` picks the
/// highest or lowest survivor. Every id left without a survivor is collected
/// and reported together.
///
/// The output depends only on the contents of `candidates` and `edges`, not
/// on their order.
pub fn resolve(
    candidates: &CandidateSet,
    edges: &[DependencyEdge],
    root_id: &str,
    policy: SelectionPolicy,
) -> Result<ResolvedSet, ResolveError> {
    if !candidates.contains_id(root_id) {
        return Err(ResolveError::RootMissing(root_id.to_string()));
    }

    let mut incoming: BTreeMap<&str, Vec<&DependencyEdge>> = BTreeMap::new();
    for edge in edges {
        incoming.entry(edge.to_id.as_str()).or_default().push(edge);
    }

    let mut chosen = BTreeMap::new();
    let mut conflicts = Vec::new();

    for (id, versions) in candidates.iter() {
        let constraints = incoming.get(id.as_str()).map(Vec::as_slice).unwrap_or_default();
        let mut satisfying = versions
            .iter()
            .filter(|version| constraints.iter().all(|edge| edge.range.contains(version)));

        let pick = match policy {
            SelectionPolicy::Highest => satisfying.next_back(),
            SelectionPolicy::Lowest => satisfying.next(),
        };

        match pick {
            Some(version) => {
                trace!(
                    "{}: picked {} from {} candidates under {} constraints",
                    id,
                    version,
                    versions.len(),
                    constraints.len()
                );
                chosen.insert(id.clone(), version.clone());
            }
            None => {
                let mut requirers: Vec<DependencyEdge> =
                    constraints.iter().map(|edge| (*edge).clone()).collect();
                requirers.sort();
                conflicts.push(Conflict {
                    id: id.clone(),
                    candidates: versions.iter().cloned().collect(),
                    constraints: requirers,
                });
            }
        }
    }

    if !conflicts.is_empty() {
        debug!("{} package(s) have no acceptable version", conflicts.len());
        return Err(ResolveError::UnsatisfiableConstraint(conflicts));
    }

    debug!("resolved {} packages with {:?} policy", chosen.len(), policy);
    Ok(ResolvedSet::from_map(chosen))
}
