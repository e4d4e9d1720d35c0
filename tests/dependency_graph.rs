//! End-to-end behaviour of the service against real files in a temp project.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use filerank::{
    DiskFs, FileRankConfig, FileRankError, FileRankService, JsonFileStore, Model, NodeStatus,
    Persistence, TreeNode,
};
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> (TempDir, FileRankService) {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        write(dir.path(), name, contents);
    }
    let service = FileRankService::open(dir.path(), &FileRankConfig::default()).unwrap();
    (dir, service)
}

fn write(root: &Path, name: &str, contents: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn find<'a>(tree: &'a TreeNode, suffix: &str) -> Option<&'a TreeNode> {
    if tree.path.as_str().ends_with(suffix) {
        return Some(tree);
    }
    tree.children.iter().find_map(|c| find(c, suffix))
}

#[test]
fn test_certain_and_possible_imports() {
    let (_dir, mut svc) = project(&[
        ("app.py", "import utils\nfrom . import helpers\n"),
        ("utils.py", "VALUE = 1\n"),
    ]);

    let report = svc.update_dependencies("app.py").unwrap();
    assert_eq!(report.imports, vec![svc.normalize("utils.py")]);
    assert_eq!(report.possible_imports, vec![".helpers".to_string()]);

    let dependents = svc.get_dependents("utils.py").unwrap();
    assert_eq!(dependents.dependents.len(), 1);
    assert_eq!(dependents.dependents[0].file, svc.normalize("app.py"));
}

#[test]
fn test_update_is_idempotent() {
    let (dir, mut svc) = project(&[("a.py", "import b\nimport requests\n"), ("b.py", "")]);

    svc.update_dependencies("a.py").unwrap();
    let first = fs::read_to_string(dir.path().join("file_rankings.json")).unwrap();
    let first_model = svc.model().clone();

    svc.update_dependencies("a.py").unwrap();
    let second = fs::read_to_string(dir.path().join("file_rankings.json")).unwrap();
    assert_eq!(first, second);
    assert_eq!(&first_model, svc.model());
}

#[test]
fn test_update_replaces_previous_imports() {
    let (dir, mut svc) = project(&[("a.py", "import b\nimport c\n"), ("b.py", ""), ("c.py", "")]);
    svc.update_dependencies("a.py").unwrap();
    assert_eq!(svc.get_dependencies("a.py").unwrap().imports.len(), 2);

    write(dir.path(), "a.py", "import c\n");
    svc.update_dependencies("a.py").unwrap();
    assert_eq!(
        svc.get_dependencies("a.py").unwrap().imports,
        vec![svc.normalize("c.py")]
    );
    assert!(svc.get_dependents("b.py").unwrap().dependents.is_empty());
}

#[test]
fn test_certain_imports_exist_at_resolution_time() {
    let (_dir, mut svc) = project(&[
        ("web/main.ts", "import { h } from './helper';\nimport x from 'lodash';\nimport './missing';\n"),
        ("web/helper.ts", "export const h = 1;\n"),
    ]);
    let report = svc.update_dependencies("web/main.ts").unwrap();
    assert_eq!(report.imports, vec![svc.normalize("web/helper.ts")]);
    for import in &report.imports {
        assert!(import.as_path().is_file());
    }
    assert_eq!(report.possible_imports, vec!["./missing", "lodash"]);
}

#[test]
fn test_javascript_directory_index() {
    let (_dir, mut svc) = project(&[
        ("src/app.js", "const lib = require('./lib');\n"),
        ("src/lib/index.js", "module.exports = {};\n"),
    ]);
    let report = svc.update_dependencies("src/app.js").unwrap();
    assert_eq!(report.imports, vec![svc.normalize("src/lib/index.js")]);
}

#[test]
fn test_bare_specifiers_stay_possible() {
    let (_dir, mut svc) = project(&[
        ("web/app.js", "import React from 'react';\nconst cfg = require('config');\n"),
        ("web/react.js", "export default {};\n"),
        ("web/config.js", "module.exports = {};\n"),
    ]);
    let report = svc.update_dependencies("web/app.js").unwrap();
    assert!(report.imports.is_empty());
    assert_eq!(report.possible_imports, vec!["config", "react"]);
    assert!(svc.get_dependents("web/react.js").unwrap().dependents.is_empty());
}

#[test]
fn test_python_package_import() {
    let (_dir, mut svc) = project(&[
        ("pkg/main.py", "from .models import User\nfrom ..shared.util import helper\n"),
        ("pkg/models/__init__.py", ""),
        ("shared/util.py", ""),
    ]);
    let report = svc.update_dependencies("pkg/main.py").unwrap();
    assert_eq!(
        report.imports,
        vec![svc.normalize("pkg/models/__init__.py"), svc.normalize("shared/util.py")]
    );
}

#[test]
fn test_dependents_mirror_dependencies() {
    let (_dir, mut svc) = project(&[
        ("a.py", "import b\nimport c\n"),
        ("b.py", "import c\n"),
        ("c.py", ""),
    ]);
    for file in ["a.py", "b.py", "c.py"] {
        svc.rank_file(file, 5, None).unwrap();
    }
    svc.scan_all_dependencies().unwrap();

    for (source, sets) in svc.model().dependencies.iter() {
        for target in &sets.imports {
            let dependents = svc.get_dependents(target.as_str()).unwrap();
            assert!(dependents.dependents.iter().any(|d| &d.file == source));
        }
    }
    assert_eq!(svc.get_dependents("c.py").unwrap().dependents.len(), 2);
}

#[test]
fn test_cycle_terminates_and_is_marked() {
    let (_dir, mut svc) = project(&[
        ("a.py", "from . import b\n"),
        ("b.py", "from . import c\n"),
        ("c.py", "from . import a\n"),
    ]);
    for file in ["a.py", "b.py", "c.py"] {
        svc.update_dependencies(file).unwrap();
    }

    let view = svc.visualize_dependencies("a.py", Some(5)).unwrap();
    let closure = &view.tree.children[0].children[0].children[0];
    assert_eq!(closure.path, svc.normalize("a.py"));
    assert_eq!(closure.status, NodeStatus::Cycle);
    assert!(closure.children.is_empty());
    assert!(view.lines.last().unwrap().ends_with("(cycle)"));

    let cycles = svc.find_cycles();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].len(), 3);
}

#[test]
fn test_deleted_target_leaves_dangling_edge() {
    let (_dir, mut svc) = project(&[("a.py", "import b\n"), ("b.py", "")]);
    svc.rank_file("b.py", 2, None).unwrap();
    svc.update_dependencies("a.py").unwrap();

    let removed = svc.delete_node("b.py").unwrap();
    assert!(removed.removed_ranking && removed.removed_node);

    assert_eq!(
        svc.get_dependencies("a.py").unwrap().imports,
        vec![svc.normalize("b.py")]
    );
    let view = svc.visualize_dependencies("a.py", None).unwrap();
    let dangling = find(&view.tree, "b.py").unwrap();
    assert_eq!(dangling.status, NodeStatus::Missing);
    assert_eq!(svc.stats().dangling_edge_count, 1);

    assert!(matches!(
        svc.delete_node("b.py"),
        Err(FileRankError::NotFound { .. })
    ));
}

#[test]
fn test_tree_sorted_by_rank() {
    let (_dir, mut svc) = project(&[
        ("main.py", "import low\nimport high\nimport plain\n"),
        ("low.py", ""),
        ("high.py", ""),
        ("plain.py", ""),
    ]);
    svc.rank_file("low.py", 9, None).unwrap();
    svc.rank_file("high.py", 1, Some("core".into())).unwrap();
    svc.update_dependencies("main.py").unwrap();

    let view = svc.visualize_dependencies("main.py", None).unwrap();
    let order: Vec<_> = view.tree.children.iter().map(|c| c.rank).collect();
    assert_eq!(order, vec![Some(1), Some(9), None]);
    assert!(view.lines[1].starts_with("├── "));
    assert!(view.lines[3].starts_with("└── "));
    assert_eq!(view.stats.certain_dependencies, 3);
}

#[test]
fn test_scan_continues_past_failures() {
    let (dir, mut svc) = project(&[
        ("good.py", "import other\n"),
        ("other.py", ""),
        ("broken.py", "def broken(:\n    pass\n"),
        ("gone.py", "import other\n"),
    ]);
    for file in ["good.py", "broken.py", "gone.py"] {
        svc.rank_file(file, 3, None).unwrap();
    }
    fs::remove_file(dir.path().join("gone.py")).unwrap();

    let report = svc.scan_all_dependencies().unwrap();
    assert_eq!(report.updated, vec![svc.normalize("good.py")]);
    assert_eq!(report.total_imports, 1);

    let kinds: Vec<_> = report.failures.iter().map(|f| f.kind.as_str()).collect();
    assert_eq!(kinds, vec!["extraction_failed", "io_error"]);
    assert!(!svc.model().dependencies.contains(&svc.normalize("broken.py")));
}

#[test]
fn test_persistence_round_trip() {
    let (dir, mut svc) = project(&[("a.py", "import b\nimport numpy\n"), ("b.py", "")]);
    svc.rank_file("a.py", 1, Some("entry point".into())).unwrap();
    svc.update_dependencies("a.py").unwrap();
    let before = svc.get_dependencies("a.py").unwrap();
    drop(svc);

    let reopened = FileRankService::open(dir.path(), &FileRankConfig::default()).unwrap();
    assert_eq!(reopened.get_dependencies("a.py").unwrap(), before);
    assert_eq!(reopened.get_file("a.py").unwrap().rank, Some(1));

    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("file_rankings.json")).unwrap())
            .unwrap();
    let b = reopened.normalize("b.py");
    assert!(document["files"].is_object());
    assert!(document["dependencies"][b.as_str()]["imports"].is_array());
    assert!(document["dependencies"][b.as_str()].get("possible_imports").is_none());
}

#[cfg(unix)]
#[test]
fn test_linked_root_keys_files_like_real_root() {
    let dir = tempfile::tempdir().unwrap();
    let real = dir.path().join("real");
    write(&real, "a.py", "import b\n");
    write(&real, "b.py", "");
    let link = dir.path().join("link");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let mut via_link = FileRankService::open(&link, &FileRankConfig::default()).unwrap();
    via_link.rank_file("a.py", 3, None).unwrap();
    via_link.update_dependencies("a.py").unwrap();
    let linked_key = via_link.normalize("a.py");
    drop(via_link);

    let via_real = FileRankService::open(&real, &FileRankConfig::default()).unwrap();
    assert_eq!(via_real.normalize("a.py"), linked_key);
    assert_eq!(via_real.get_file("a.py").unwrap().rank, Some(3));
    assert_eq!(via_real.get_dependents("b.py").unwrap().dependents.len(), 1);
}

#[test]
fn test_configured_data_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".filerank/config.toml", "data_file = \"state/graph.json\"\n");
    write(dir.path(), "a.py", "");

    let config = FileRankConfig::load(&FileRankConfig::path_for(dir.path()));
    let mut svc = FileRankService::open(dir.path(), &config).unwrap();
    svc.rank_file("a.py", 4, None).unwrap();
    assert!(dir.path().join("state/graph.json").is_file());
}

#[test]
fn test_oversized_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "big.py", &"import os\n".repeat(100));
    let config = FileRankConfig {
        max_file_bytes: 64,
        ..FileRankConfig::default()
    };
    let mut svc = FileRankService::open(dir.path(), &config).unwrap();
    let err = svc.update_dependencies("big.py").unwrap_err();
    assert!(matches!(err, FileRankError::TooLarge { .. }));
    assert_eq!(err.kind(), "io_error");
}

/// Delegates to a JSON store but can be told to fail every save.
struct FlakyStore {
    inner: JsonFileStore,
    fail: Arc<AtomicBool>,
}

impl Persistence for FlakyStore {
    fn load(&self) -> filerank::Result<Model> {
        self.inner.load()
    }

    fn save(&self, model: &Model) -> filerank::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(FileRankError::persistence(
                self.inner.path(),
                std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            ));
        }
        self.inner.save(model)
    }
}

#[test]
fn test_failed_save_leaves_model_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.py", "import b\n");
    write(dir.path(), "b.py", "");
    let data_file = dir.path().join("file_rankings.json");
    let fail = Arc::new(AtomicBool::new(false));
    let store = FlakyStore {
        inner: JsonFileStore::new(&data_file),
        fail: Arc::clone(&fail),
    };
    let mut svc = FileRankService::new(Box::new(store), Box::new(DiskFs::new(1024 * 1024)))
        .unwrap()
        .with_base_dir(dir.path());

    svc.rank_file("a.py", 2, None).unwrap();
    let saved = fs::read_to_string(&data_file).unwrap();

    fail.store(true, Ordering::SeqCst);
    let err = svc.update_dependencies("a.py").unwrap_err();
    assert_eq!(err.kind(), "persistence");
    assert!(svc.model().dependencies.is_empty());
    assert_eq!(fs::read_to_string(&data_file).unwrap(), saved);

    fail.store(false, Ordering::SeqCst);
    svc.update_dependencies("a.py").unwrap();
    assert_eq!(svc.model().dependencies.len(), 2);
}
