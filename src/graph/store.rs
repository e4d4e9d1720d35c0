//! The dependency graph store.
//!
//! Nodes are canonical paths; an edge `a → b` is membership of `b` in `a`'s
//! certain-import set. Deletion never rewrites other nodes, so edges may dangle.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::types::ImportSets;
use crate::error::{FileRankError, Result};
use crate::path::CanonicalPath;

/// Mapping from canonical path to that node's import sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    nodes: BTreeMap<CanonicalPath, ImportSets>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Mutation ───────────────────────────────────────────────

    /// Replace `source`'s import sets with freshly computed ones.
    ///
    /// Targets without a node of their own get an empty one, so every edge
    /// target is a node until explicitly removed.
    pub fn upsert_edges(
        &mut self,
        source: CanonicalPath,
        certain_targets: BTreeSet<CanonicalPath>,
        possible_tokens: BTreeSet<String>,
    ) {
        debug!(
            file = %source,
            certain = certain_targets.len(),
            possible = possible_tokens.len(),
            "replacing import sets"
        );
        for target in &certain_targets {
            if !self.nodes.contains_key(target) {
                self.nodes.insert(target.clone(), ImportSets::default());
            }
        }
        self.nodes.insert(
            source,
            ImportSets {
                imports: certain_targets,
                possible_imports: possible_tokens,
            },
        );
    }

    /// Delete a node's own entry. Edges pointing at it are left in place.
    pub fn remove_node(&mut self, path: &CanonicalPath) -> Result<ImportSets> {
        debug!(file = %path, "removing graph node");
        self.nodes
            .remove(path)
            .ok_or_else(|| FileRankError::not_found(path.as_str()))
    }

    // ─── Queries ────────────────────────────────────────────────

    pub fn contains(&self, path: &CanonicalPath) -> bool {
        self.nodes.contains_key(path)
    }

    /// The full import sets of a node.
    pub fn node(&self, path: &CanonicalPath) -> Result<&ImportSets> {
        self.nodes
            .get(path)
            .ok_or_else(|| FileRankError::not_found(path.as_str()))
    }

    /// Direct certain dependencies of `path`.
    pub fn dependencies_of(&self, path: &CanonicalPath) -> Result<&BTreeSet<CanonicalPath>> {
        self.node(path).map(|sets| &sets.imports)
    }

    /// Every node whose certain imports contain `path`.
    ///
    /// Linear scan over all nodes; there is no reverse index.
    pub fn dependents_of(&self, path: &CanonicalPath) -> Result<BTreeSet<CanonicalPath>> {
        if !self.contains(path) {
            return Err(FileRankError::not_found(path.as_str()));
        }
        Ok(self.importers_of(path))
    }

    /// Like [`dependents_of`](Self::dependents_of) but without the existence check,
    /// for callers that track identity elsewhere (e.g. ranked-only files).
    pub fn importers_of(&self, path: &CanonicalPath) -> BTreeSet<CanonicalPath> {
        self.nodes
            .iter()
            .filter(|(_, sets)| sets.imports.contains(path))
            .map(|(source, _)| source.clone())
            .collect()
    }

    pub fn paths(&self) -> impl Iterator<Item = &CanonicalPath> {
        self.nodes.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalPath, &ImportSets)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|s| s.imports.len()).sum()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::path::normalize_with_base;
    use std::path::Path;

    fn cp(p: &str) -> CanonicalPath {
        normalize_with_base(p, Path::new("/"))
    }

    fn set(paths: &[&str]) -> BTreeSet<CanonicalPath> {
        paths.iter().map(|p| cp(p)).collect()
    }

    #[test]
    fn test_empty_graph() {
        let graph = DependencyGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert!(matches!(
            graph.dependencies_of(&cp("/a.py")),
            Err(FileRankError::NotFound { .. })
        ));
        assert!(matches!(
            graph.dependents_of(&cp("/a.py")),
            Err(FileRankError::NotFound { .. })
        ));
    }

    #[test]
    fn test_upsert_replaces_not_merges() {
        let mut graph = DependencyGraph::new();
        graph.upsert_edges(cp("/f.py"), set(&["/a.py", "/b.py"]), BTreeSet::new());
        graph.upsert_edges(cp("/f.py"), set(&["/a.py"]), BTreeSet::new());
        assert_eq!(graph.dependencies_of(&cp("/f.py")).unwrap(), &set(&["/a.py"]));
    }

    #[test]
    fn test_upsert_registers_targets() {
        let mut graph = DependencyGraph::new();
        graph.upsert_edges(cp("/f.py"), set(&["/a.py"]), BTreeSet::new());
        assert!(graph.contains(&cp("/a.py")));
        assert!(graph.dependencies_of(&cp("/a.py")).unwrap().is_empty());
    }

    #[test]
    fn test_upsert_keeps_existing_target_imports() {
        let mut graph = DependencyGraph::new();
        graph.upsert_edges(cp("/a.py"), set(&["/c.py"]), BTreeSet::new());
        graph.upsert_edges(cp("/f.py"), set(&["/a.py"]), BTreeSet::new());
        assert_eq!(graph.dependencies_of(&cp("/a.py")).unwrap(), &set(&["/c.py"]));
    }

    #[test]
    fn test_dependents_symmetry() {
        let mut graph = DependencyGraph::new();
        graph.upsert_edges(cp("/a.py"), set(&["/b.py", "/c.py"]), BTreeSet::new());
        graph.upsert_edges(cp("/b.py"), set(&["/c.py"]), BTreeSet::new());

        for f in graph.paths().cloned().collect::<Vec<_>>() {
            for g in graph.paths().cloned().collect::<Vec<_>>() {
                let forward = graph.dependencies_of(&f).unwrap().contains(&g);
                let backward = graph.dependents_of(&g).unwrap().contains(&f);
                assert_eq!(forward, backward, "{f} -> {g}");
            }
        }
        assert_eq!(graph.dependents_of(&cp("/c.py")).unwrap(), set(&["/a.py", "/b.py"]));
    }

    #[test]
    fn test_self_loop_preserved() {
        let mut graph = DependencyGraph::new();
        graph.upsert_edges(cp("/a.py"), set(&["/a.py"]), BTreeSet::new());
        assert!(graph.dependencies_of(&cp("/a.py")).unwrap().contains(&cp("/a.py")));
        assert!(graph.dependents_of(&cp("/a.py")).unwrap().contains(&cp("/a.py")));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_remove_does_not_cascade() {
        let mut graph = DependencyGraph::new();
        graph.upsert_edges(cp("/a.py"), set(&["/b.py"]), BTreeSet::new());
        graph.remove_node(&cp("/b.py")).unwrap();

        assert!(graph.dependencies_of(&cp("/a.py")).unwrap().contains(&cp("/b.py")));
        assert!(matches!(
            graph.dependencies_of(&cp("/b.py")),
            Err(FileRankError::NotFound { .. })
        ));
        assert!(graph.remove_node(&cp("/b.py")).is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let mut graph = DependencyGraph::new();
        let possible: BTreeSet<String> = ["requests".to_string()].into_iter().collect();
        graph.upsert_edges(cp("/a.py"), set(&["/b.py"]), possible);

        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["/a.py"]["imports"][0], "/b.py");
        assert_eq!(value["/a.py"]["possible_imports"][0], "requests");
        assert!(value["/b.py"].get("possible_imports").is_none());
    }
}
