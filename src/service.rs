//! The FileRank service: the operations the dispatch layer calls.
//!
//! Single writer, request at a time. Every mutating operation works on a
//! draft copy of the model, saves the draft, and only then swaps it in, so
//! neither memory nor disk ever holds a half-applied request.

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{resolve_root, FileRankConfig};
use crate::error::{FileRankError, Result};
use crate::fs::{DiskFs, SourceFs};
use crate::graph::{
    build_tree, find_cycles, render_tree, resolve, GraphStats, ImportSets, NodeStatus,
    Resolution, TreeNode,
};
use crate::model::{FileRecord, Model};
use crate::parser::extract_imports;
use crate::path::{normalize_with_base, CanonicalPath};
use crate::storage::{JsonFileStore, Persistence};

/// Owns the model and its collaborators.
pub struct FileRankService {
    model: Model,
    store: Box<dyn Persistence>,
    fs: Box<dyn SourceFs>,
    base_dir: PathBuf,
    default_tree_depth: usize,
    max_tree_depth: usize,
}

impl FileRankService {
    /// Load the model from `store`. Relative request paths resolve against
    /// the process working directory.
    pub fn new(store: Box<dyn Persistence>, fs: Box<dyn SourceFs>) -> Result<Self> {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        let model = store.load()?;
        Ok(Self {
            model,
            store,
            fs,
            base_dir,
            default_tree_depth: crate::graph::DEFAULT_TREE_DEPTH,
            max_tree_depth: crate::graph::MAX_TREE_DEPTH,
        })
    }

    /// Open the on-disk service for a project root. The root goes through
    /// [`resolve_root`] so every entry point keys files the same way.
    pub fn open(root: &Path, config: &FileRankConfig) -> Result<Self> {
        let root = resolve_root(root);
        let root = root.as_path();
        let store = JsonFileStore::new(config.resolve_data_path(root));
        let fs = DiskFs::new(config.max_file_bytes);
        Ok(Self::new(Box::new(store), Box::new(fs))?
            .with_base_dir(root)
            .with_default_depth(config.default_tree_depth)
            .with_max_depth(config.max_tree_depth))
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_default_depth(mut self, depth: usize) -> Self {
        self.default_tree_depth = depth;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_tree_depth = depth;
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Canonical identity of a request path.
    pub fn normalize(&self, path: &str) -> CanonicalPath {
        normalize_with_base(path, &self.base_dir)
    }

    // ─── Dependency Operations ──────────────────────────────────

    /// Re-extract and re-resolve one file, replacing its import sets.
    pub fn update_dependencies(&mut self, path: &str) -> Result<UpdateReport> {
        let path = self.normalize(path);
        let report = self.commit(|svc, model| svc.apply_update(model, &path))?;
        info!(
            file = %report.file,
            imports = report.imports_count,
            possible = report.possible_count,
            "dependencies updated"
        );
        Ok(report)
    }

    /// Update every ranked file. Per-file failures are collected, not raised.
    pub fn scan_all_dependencies(&mut self) -> Result<ScanReport> {
        let report = self.commit(|svc, model| {
            let mut report = ScanReport::default();
            for path in model.ranked_paths() {
                match svc.apply_update(model, &path) {
                    Ok(update) => {
                        report.total_imports += update.imports_count;
                        report.total_possible_imports += update.possible_count;
                        report.updated.push(update.file);
                    }
                    Err(e) => {
                        warn!(file = %path, error = %e, "skipping file during scan");
                        report.failures.push(ScanFailure {
                            file: path,
                            kind: e.kind().to_string(),
                            message: e.to_string(),
                        });
                    }
                }
            }
            Ok(report)
        })?;
        info!(
            updated = report.updated.len(),
            failed = report.failures.len(),
            "dependency scan complete"
        );
        Ok(report)
    }

    /// Direct dependencies of a file.
    pub fn get_dependencies(&self, path: &str) -> Result<DependencyReport> {
        let path = self.normalize(path);
        let sets = self.known_import_sets(&path)?;
        Ok(DependencyReport {
            imports: sets.imports.iter().cloned().collect(),
            possible_imports: sets.possible_imports.iter().cloned().collect(),
            file: path,
        })
    }

    /// Files whose certain imports contain `path`.
    pub fn get_dependents(&self, path: &str) -> Result<DependentsReport> {
        let path = self.normalize(path);
        if !self.model.is_known(&path) {
            return Err(FileRankError::not_found(path.as_str()));
        }
        Ok(DependentsReport {
            dependents: self.dependents_info(&path),
            file: path,
        })
    }

    /// Dependency tree plus its text rendering, dependents and counts.
    pub fn visualize_dependencies(
        &self,
        path: &str,
        max_depth: Option<usize>,
    ) -> Result<Visualization> {
        let path = self.normalize(path);
        let depth = max_depth.unwrap_or(self.default_tree_depth);
        if depth > self.max_tree_depth {
            return Err(FileRankError::InvalidParams(format!(
                "max_depth {} is over the limit of {}",
                depth, self.max_tree_depth
            )));
        }
        let sets = self.known_import_sets(&path)?;

        let tree = if self.model.dependencies.contains(&path) {
            build_tree(&self.model.dependencies, &path, depth, |p| {
                self.model.rank_of(p)
            })?
        } else {
            TreeNode {
                path: path.clone(),
                rank: self.model.rank_of(&path),
                status: NodeStatus::Expanded,
                children: Vec::new(),
            }
        };
        debug!(file = %path, depth, nodes = tree.size(), "dependency tree built");

        let dependents = self.dependents_info(&path);
        let stats = VisualizeStats {
            depth,
            certain_dependencies: sets.imports.len(),
            possible_imports: sets.possible_imports.len(),
            dependents_count: dependents.len(),
        };
        Ok(Visualization {
            lines: render_tree(&tree),
            file: path,
            tree,
            dependents,
            stats,
        })
    }

    /// Remove a file's ranking and graph entry. Other files' edges to it stay.
    pub fn delete_node(&mut self, path: &str) -> Result<DeleteReport> {
        let path = self.normalize(path);
        let report = self.commit(|_, model| {
            let removed_ranking = model.files.remove(&path).is_some();
            let removed_node = model.dependencies.remove_node(&path).is_ok();
            if !removed_ranking && !removed_node {
                return Err(FileRankError::not_found(path.as_str()));
            }
            Ok(DeleteReport {
                file: path.clone(),
                removed_ranking,
                removed_node,
            })
        })?;
        info!(file = %report.file, "file removed");
        Ok(report)
    }

    pub fn find_cycles(&self) -> Vec<Vec<CanonicalPath>> {
        find_cycles(&self.model.dependencies)
    }

    pub fn stats(&self) -> GraphStats {
        crate::graph::stats(&self.model.dependencies, self.model.files.len())
    }

    // ─── Ranking Operations ─────────────────────────────────────

    /// Add or update a file's rank. A `None` summary keeps the existing one.
    pub fn rank_file(
        &mut self,
        path: &str,
        rank: i64,
        summary: Option<String>,
    ) -> Result<FileReport> {
        let rank = u8::try_from(rank)
            .ok()
            .filter(|r| (1..=10).contains(r))
            .ok_or(FileRankError::InvalidRank(rank))?;
        let path = self.normalize(path);
        if !self.fs.file_exists(path.as_path()) {
            return Err(FileRankError::FileMissing {
                path: path.to_string(),
            });
        }

        self.commit(|_, model| {
            let record = model.files.entry(path.clone()).or_default();
            record.rank = Some(rank);
            if summary.is_some() {
                record.summary = summary;
            }
            Ok(())
        })?;
        info!(file = %path, rank, "file ranked");
        self.file_report(&path)
    }

    /// A ranked file with its dependencies and importers.
    pub fn get_file(&self, path: &str) -> Result<FileReport> {
        let path = self.normalize(path);
        self.file_report(&path)
    }

    pub fn get_all_files(&self) -> Vec<FileReport> {
        self.model
            .files
            .keys()
            .filter_map(|p| self.file_report(p).ok())
            .collect()
    }

    /// Ranked files at or below `dir`.
    pub fn get_files_by_dir(&self, dir: &str) -> Vec<FileReport> {
        let dir = self.normalize(dir);
        self.model
            .files
            .keys()
            .filter(|p| p.is_within(&dir))
            .filter_map(|p| self.file_report(p).ok())
            .collect()
    }

    // ─── Internal Helpers ───────────────────────────────────────

    /// Run `op` on a draft, persist it, then make it live.
    fn commit<T>(&mut self, op: impl FnOnce(&Self, &mut Model) -> Result<T>) -> Result<T> {
        let mut draft = self.model.clone();
        let out = op(self, &mut draft)?;
        self.store.save(&draft)?;
        self.model = draft;
        Ok(out)
    }

    /// Extract, resolve and upsert one file into `model`.
    fn apply_update(&self, model: &mut Model, path: &CanonicalPath) -> Result<UpdateReport> {
        let (certain, possible) = self.detect(model, path)?;
        let report = UpdateReport {
            file: path.clone(),
            imports_count: certain.len(),
            possible_count: possible.len(),
            imports: certain.iter().cloned().collect(),
            possible_imports: possible.iter().cloned().collect(),
        };
        model.dependencies.upsert_edges(path.clone(), certain, possible);
        Ok(report)
    }

    fn detect(
        &self,
        model: &Model,
        path: &CanonicalPath,
    ) -> Result<(BTreeSet<CanonicalPath>, BTreeSet<String>)> {
        let source = self.fs.read_file_text(path.as_path())?;
        let extraction = extract_imports(path.as_path(), &source);
        if let Some(reason) = extraction.failed {
            return Err(FileRankError::ExtractionFailed {
                path: path.to_string(),
                reason,
            });
        }

        let known = model.known_paths();
        let mut certain = BTreeSet::new();
        let mut possible = BTreeSet::new();
        for import in &extraction.imports {
            match resolve(path, import, &known, self.fs.as_ref()) {
                Resolution::Certain(target) => {
                    certain.insert(target);
                }
                Resolution::Possible(token) => {
                    possible.insert(token);
                }
            }
        }
        Ok((certain, possible))
    }

    /// Import sets of a known path; ranked files never scanned have empty sets.
    fn known_import_sets(&self, path: &CanonicalPath) -> Result<ImportSets> {
        match self.model.dependencies.node(path) {
            Ok(sets) => Ok(sets.clone()),
            Err(_) if self.model.files.contains_key(path) => Ok(ImportSets::default()),
            Err(e) => Err(e),
        }
    }

    fn dependents_info(&self, path: &CanonicalPath) -> Vec<DependentInfo> {
        self.model
            .dependencies
            .importers_of(path)
            .into_iter()
            .map(|file| {
                let record = self.model.files.get(&file).cloned().unwrap_or_default();
                DependentInfo {
                    file,
                    rank: record.rank,
                    summary: record.summary,
                }
            })
            .collect()
    }

    fn file_report(&self, path: &CanonicalPath) -> Result<FileReport> {
        let FileRecord { rank, summary } = self
            .model
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| FileRankError::not_found(path.as_str()))?;
        Ok(FileReport {
            file: path.clone(),
            rank,
            summary,
            dependencies: self.model.dependencies.node(path).ok().cloned(),
            imported_by: self
                .model
                .dependencies
                .importers_of(path)
                .into_iter()
                .collect(),
        })
    }
}

// ─── Report Types ───────────────────────────────────────────────

/// Result of `update_dependencies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    pub file: CanonicalPath,
    pub imports: Vec<CanonicalPath>,
    pub possible_imports: Vec<String>,
    pub imports_count: usize,
    pub possible_count: usize,
}

/// A file the scan could not update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub file: CanonicalPath,
    pub kind: String,
    pub message: String,
}

/// Result of `scan_all_dependencies`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub updated: Vec<CanonicalPath>,
    pub failures: Vec<ScanFailure>,
    pub total_imports: usize,
    pub total_possible_imports: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    pub file: CanonicalPath,
    pub imports: Vec<CanonicalPath>,
    pub possible_imports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependentInfo {
    pub file: CanonicalPath,
    pub rank: Option<u8>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependentsReport {
    pub file: CanonicalPath,
    pub dependents: Vec<DependentInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualizeStats {
    pub depth: usize,
    pub certain_dependencies: usize,
    pub possible_imports: usize,
    pub dependents_count: usize,
}

/// Result of `visualize_dependencies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Visualization {
    pub file: CanonicalPath,
    pub tree: TreeNode,
    pub lines: Vec<String>,
    pub dependents: Vec<DependentInfo>,
    pub stats: VisualizeStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub file: CanonicalPath,
    pub removed_ranking: bool,
    pub removed_node: bool,
}

/// A ranked file with its graph context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: CanonicalPath,
    pub rank: Option<u8>,
    pub summary: Option<String>,
    pub dependencies: Option<ImportSets>,
    pub imported_by: Vec<CanonicalPath>,
}
