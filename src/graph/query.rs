//! Graph queries: dependency trees, cycles and statistics.
//!
//! Everything here reads the store and returns plain values; nothing holds
//! on to the graph after returning.

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use std::cmp::Ordering;
use std::collections::HashSet;

use super::store::DependencyGraph;
use super::types::{GraphStats, NodeStatus, TreeNode};
use crate::error::{FileRankError, Result};
use crate::path::CanonicalPath;

/// Default expansion depth for dependency trees.
pub const DEFAULT_TREE_DEPTH: usize = 3;

/// Deepest tree a caller may request. Expansion is per branch, so tree size
/// grows exponentially with depth on layered graphs.
pub const MAX_TREE_DEPTH: usize = 10;

/// Expand the certain-import edges from `root` into a tree, at most
/// `max_depth` levels below the root.
///
/// Cycle detection uses the ancestor set of the current branch, so a file
/// reached through two different branches appears under both. A child equal
/// to one of its ancestors becomes a [`NodeStatus::Cycle`] leaf.
pub fn build_tree<F>(
    graph: &DependencyGraph,
    root: &CanonicalPath,
    max_depth: usize,
    rank_of: F,
) -> Result<TreeNode>
where
    F: Fn(&CanonicalPath) -> Option<u8>,
{
    if !graph.contains(root) {
        return Err(FileRankError::not_found(root.as_str()));
    }
    let mut builder = TreeBuilder {
        graph,
        max_depth,
        rank_of,
        ancestors: HashSet::new(),
    };
    Ok(builder.expand(root, 0))
}

struct TreeBuilder<'g, F> {
    graph: &'g DependencyGraph,
    max_depth: usize,
    rank_of: F,
    ancestors: HashSet<CanonicalPath>,
}

impl<F> TreeBuilder<'_, F>
where
    F: Fn(&CanonicalPath) -> Option<u8>,
{
    fn expand(&mut self, path: &CanonicalPath, depth: usize) -> TreeNode {
        let rank = (self.rank_of)(path);
        let leaf = |status| TreeNode {
            path: path.clone(),
            rank,
            status,
            children: Vec::new(),
        };

        let graph = self.graph;
        let Ok(deps) = graph.dependencies_of(path) else {
            return leaf(NodeStatus::Missing);
        };
        if deps.is_empty() {
            return leaf(NodeStatus::Expanded);
        }
        if depth >= self.max_depth {
            return leaf(NodeStatus::DepthLimit);
        }

        let mut ordered: Vec<(Option<u8>, &CanonicalPath)> =
            deps.iter().map(|d| ((self.rank_of)(d), d)).collect();
        ordered.sort_by(|a, b| by_rank(a.0, b.0).then_with(|| a.1.cmp(b.1)));

        self.ancestors.insert(path.clone());
        let children = ordered
            .into_iter()
            .map(|(child_rank, child)| {
                if self.ancestors.contains(child) {
                    TreeNode {
                        path: child.clone(),
                        rank: child_rank,
                        status: NodeStatus::Cycle,
                        children: Vec::new(),
                    }
                } else {
                    self.expand(child, depth + 1)
                }
            })
            .collect();
        self.ancestors.remove(path);

        TreeNode {
            path: path.clone(),
            rank,
            status: NodeStatus::Expanded,
            children,
        }
    }
}

/// Ranked files first (1 is most important), unranked last.
fn by_rank(a: Option<u8>, b: Option<u8>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Render a tree as box-drawing text lines.
pub fn render_tree(tree: &TreeNode) -> Vec<String> {
    let mut lines = vec![format!("{}{}", tree.path, annotation(tree))];
    render_children(&tree.children, "", &mut lines);
    lines
}

fn render_children(children: &[TreeNode], prefix: &str, lines: &mut Vec<String>) {
    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == children.len();
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{prefix}{connector}{}{}", child.path, annotation(child)));

        let next_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        render_children(&child.children, &next_prefix, lines);
    }
}

fn annotation(node: &TreeNode) -> String {
    let mut out = String::new();
    if let Some(rank) = node.rank {
        out.push_str(&format!(" [rank: {rank}]"));
    }
    match node.status {
        NodeStatus::Expanded => {}
        NodeStatus::Cycle => out.push_str(" (cycle)"),
        NodeStatus::DepthLimit => out.push_str(" (...)"),
        NodeStatus::Missing => out.push_str(" (missing)"),
    }
    out
}

/// Groups of files that import each other, plus files importing themselves.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Vec<CanonicalPath>> {
    let mut digraph: DiGraphMap<&CanonicalPath, ()> = DiGraphMap::new();
    for (source, sets) in graph.iter() {
        digraph.add_node(source);
        for target in &sets.imports {
            digraph.add_edge(source, target, ());
        }
    }

    let mut cycles: Vec<Vec<CanonicalPath>> = tarjan_scc(&digraph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || digraph.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut members: Vec<CanonicalPath> = scc.into_iter().cloned().collect();
            members.sort();
            members
        })
        .collect();
    cycles.sort();
    cycles
}

pub fn stats(graph: &DependencyGraph, ranked_file_count: usize) -> GraphStats {
    let mut possible_import_count = 0;
    let mut dangling_edge_count = 0;
    for (_, sets) in graph.iter() {
        possible_import_count += sets.possible_imports.len();
        dangling_edge_count += sets.imports.iter().filter(|t| !graph.contains(t)).count();
    }

    GraphStats {
        node_count: graph.len(),
        edge_count: graph.edge_count(),
        possible_import_count,
        ranked_file_count,
        dangling_edge_count,
    }
}
