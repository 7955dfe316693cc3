use serde::{Deserialize, Serialize};

/// Which surviving version the resolver keeps for a package id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionPolicy {
    /// The maximum version satisfying every constraint
    #[default]
    Highest,
    /// The minimum version satisfying every constraint
    Lowest,
}
