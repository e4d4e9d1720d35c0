//! The persisted document: ranking table plus dependency graph.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use crate::graph::DependencyGraph;
use crate::path::CanonicalPath;

/// Rank and summary for a ranked file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// 1 is most important, 10 least.
    #[serde(default, deserialize_with = "lenient_rank")]
    pub rank: Option<u8>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// A stored rank outside 1..=10 (or not an integer) drops to unranked
/// instead of failing the whole document.
fn lenient_rank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_i64() {
            Some(rank @ 1..=10) => Some(rank as u8),
            _ => {
                warn!(rank = %value, "ignoring stored rank outside 1..=10");
                None
            }
        },
    })
}

/// Everything the service owns, loaded and saved as one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub files: BTreeMap<CanonicalPath, FileRecord>,
    #[serde(default)]
    pub dependencies: DependencyGraph,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rank_of(&self, path: &CanonicalPath) -> Option<u8> {
        self.files.get(path).and_then(|record| record.rank)
    }

    /// Ranked file paths, sorted.
    pub fn ranked_paths(&self) -> Vec<CanonicalPath> {
        self.files.keys().cloned().collect()
    }

    /// True if the path is ranked or is a graph node.
    pub fn is_known(&self, path: &CanonicalPath) -> bool {
        self.files.contains_key(path) || self.dependencies.contains(path)
    }

    /// Every identity the resolver may treat as an existing file.
    pub fn known_paths(&self) -> BTreeSet<CanonicalPath> {
        self.files
            .keys()
            .chain(self.dependencies.paths())
            .cloned()
            .collect()
    }
}
