//! # FileRank
//!
//! File importance rankings and an import dependency graph for AI agents.
//!
//! FileRank keeps a 1–10 rank and a short summary per file, extracts each
//! file's imports, resolves them to files on disk and answers questions over
//! the resulting graph: what a file imports, what imports it, and what its
//! dependency tree looks like.
//!
//! ## Key Features
//!
//! - **Two confidence tiers**: imports resolved to a real file are *certain*;
//!   everything else is kept verbatim as *possible*
//! - **Persistent**: one JSON document, saved after every change
//! - **Cycle-safe**: trees mark cycle closures instead of recursing
//! - **Multi-language**: Python (tree-sitter), JavaScript, TypeScript
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use filerank::{FileRankConfig, FileRankService};
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let mut service = FileRankService::open(root, &FileRankConfig::default())?;
//! service.rank_file("src/app.py", 1, Some("entry point".into()))?;
//! service.update_dependencies("src/app.py")?;
//! for line in service.visualize_dependencies("src/app.py", None)?.lines {
//!     println!("{line}");
//! }
//! # Ok::<(), filerank::FileRankError>(())
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod graph;
pub mod mcp;
pub mod model;
pub mod parser;
pub mod path;
pub mod service;
pub mod storage;

pub use config::FileRankConfig;
pub use error::{FileRankError, Result};
pub use fs::{DiskFs, MemoryFs, SourceFs};
pub use graph::{
    Confidence, DependencyGraph, GraphStats, ImportSets, NodeStatus, RawImport, Resolution,
    TreeNode,
};
pub use model::{FileRecord, Model};
pub use parser::{extract_imports, SupportedLanguage};
pub use path::{normalize, normalize_with_base, CanonicalPath};
pub use service::{
    DeleteReport, DependencyReport, DependentInfo, DependentsReport, FileRankService, FileReport,
    ScanFailure, ScanReport, UpdateReport, Visualization,
};
pub use storage::{JsonFileStore, MemoryStore, Persistence};
