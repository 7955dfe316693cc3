use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque compatibility descriptor (a target triple, a framework moniker...).
///
/// The engine only passes it through to the metadata client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformTag(String);

impl PlatformTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlatformTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}
