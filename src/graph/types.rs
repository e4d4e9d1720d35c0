//! Core types for the dependency graph.
//!
//! Defines the confidence model for extracted imports, the two-stage
//! resolution outcome, per-node import sets and the tree value produced by
//! the query engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::path::CanonicalPath;

/// How much the extractor trusts a raw import token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Came from a syntax tree and is syntactically project-relative.
    CertainSyntax,
    /// Pattern match or third-party name; needs disk verification.
    Heuristic,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::CertainSyntax => write!(f, "certain_syntax"),
            Confidence::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// An import token extracted from a source file, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawImport {
    /// The module name or specifier, verbatim (e.g. "utils", ".helpers", "./api").
    pub token: String,
    pub confidence: Confidence,
    /// Line number of the import (1-indexed).
    pub line: usize,
}

impl RawImport {
    pub fn new(token: impl Into<String>, confidence: Confidence, line: usize) -> Self {
        Self {
            token: token.into(),
            confidence,
            line,
        }
    }
}

/// Everything the extractor produced for one file.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub imports: Vec<RawImport>,
    /// Set when the source could not be parsed; `imports` is empty then.
    pub failed: Option<String>,
}

impl Extraction {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            imports: Vec::new(),
            failed: Some(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failed.is_some()
    }
}

/// Outcome of resolving one raw import.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Verified to point at a real (or already known) file.
    Certain(CanonicalPath),
    /// Could not be verified; the raw token is kept verbatim.
    Possible(String),
}

/// The import sets stored per graph node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSets {
    /// Certain dependencies (edges), as canonical paths.
    #[serde(default)]
    pub imports: BTreeSet<CanonicalPath>,
    /// Unresolved import tokens.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub possible_imports: BTreeSet<String>,
}

// ─── Tree Query Results ─────────────────────────────────────────────────────

/// How a node in a dependency tree ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Children (if any) were expanded.
    Expanded,
    /// The node repeats one of its ancestors; not expanded further.
    Cycle,
    /// Depth limit reached while the node still had dependencies.
    DepthLimit,
    /// Edge target has no entry in the graph (dangling after a deletion).
    Missing,
}

/// A node of a dependency tree. Pure value, detached from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub path: CanonicalPath,
    /// Rank from the ranking table; `None` means unranked.
    pub rank: Option<u8>,
    pub status: NodeStatus,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Total number of nodes in this subtree, including itself.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }
}

/// Statistics about the graph and ranking table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub possible_import_count: usize,
    pub ranked_file_count: usize,
    pub dangling_edge_count: usize,
}
