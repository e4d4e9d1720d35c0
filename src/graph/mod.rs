//! Dependency graph module: import edges between files.
//!
//! Provides the graph data model, import resolution, the store and the
//! query engine built on top of it.

pub mod query;
pub mod resolver;
pub mod store;
pub mod types;

pub use query::{build_tree, find_cycles, render_tree, stats, DEFAULT_TREE_DEPTH, MAX_TREE_DEPTH};
pub use resolver::resolve;
pub use store::DependencyGraph;
pub use types::{
    Confidence, Extraction, GraphStats, ImportSets, NodeStatus, RawImport, Resolution, TreeNode,
};
