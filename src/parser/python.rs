//! Python import extraction via AST traversal.
//!
//! Handles:
//!   import pkg.mod
//!   import pkg.mod as alias
//!   from pkg import name
//!   from . import sibling
//!   from ..pkg.mod import name

use tree_sitter::{Node, Parser};
use tracing::debug;

use super::language::SupportedLanguage;
use crate::graph::types::{Confidence, Extraction, RawImport};

/// Modules compiled into the interpreter on common CPython builds. They
/// never correspond to a file, so they are dropped before resolution.
const BUILTIN_MODULES: &[&str] = &[
    "_abc", "_ast", "_codecs", "_collections", "_functools", "_imp", "_io", "_locale",
    "_operator", "_signal", "_sre", "_stat", "_string", "_symtable", "_thread", "_tokenize",
    "_tracemalloc", "_typing", "_warnings", "_weakref", "array", "atexit", "binascii",
    "builtins", "cmath", "errno", "faulthandler", "gc", "itertools", "marshal", "math", "mmap",
    "msvcrt", "nt", "posix", "pwd", "select", "sys", "time", "winreg", "xxsubtype", "zlib",
];

/// Parse Python source and collect one raw token per imported module source.
///
/// A source with syntax errors yields a failed extraction rather than an error.
pub fn extract_python_imports(source: &str) -> Extraction {
    let mut parser = Parser::new();
    let Some(language) = SupportedLanguage::Python.tree_sitter_language() else {
        return Extraction::failed("no Python grammar available");
    };
    if let Err(e) = parser.set_language(&language) {
        return Extraction::failed(format!("grammar load failed: {e}"));
    }

    let Some(tree) = parser.parse(source, None) else {
        return Extraction::failed("parser produced no tree");
    };

    let root = tree.root_node();
    if root.has_error() {
        let (row, col) = first_error_position(&root).unwrap_or((0, 0));
        debug!(line = row + 1, column = col + 1, "python syntax error");
        return Extraction::failed(format!("syntax error near line {}", row + 1));
    }

    let mut imports = Vec::new();
    extract_from_node(&root, source.as_bytes(), &mut imports);
    Extraction {
        imports,
        failed: None,
    }
}

/// Recursively walk the AST, picking up imports at any nesting level.
fn extract_from_node(node: &Node, source: &[u8], imports: &mut Vec<RawImport>) {
    match node.kind() {
        "import_statement" => {
            extract_import_statement(node, source, imports);
            return;
        }
        "import_from_statement" => {
            extract_from_statement(node, source, imports);
            return;
        }
        // `from __future__ import x` names compiler features, not files.
        "future_import_statement" => return,
        _ => {}
    }

    let count = node.child_count();
    for i in 0..count {
        if let Some(child) = node.child(i) {
            extract_from_node(&child, source, imports);
        }
    }
}

/// `import a.b, c as d`
fn extract_import_statement(node: &Node, source: &[u8], imports: &mut Vec<RawImport>) {
    let line = node.start_position().row + 1;
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        if let Some(module) = imported_name(&name, source) {
            if is_builtin_module(&module) {
                continue;
            }
            imports.push(RawImport::new(module.clone(), confidence_for(&module), line));
        }
    }
}

/// `from <module> import <names>`
fn extract_from_statement(node: &Node, source: &[u8], imports: &mut Vec<RawImport>) {
    let line = node.start_position().row + 1;
    let Some(module) = node.child_by_field_name("module_name") else {
        return;
    };
    let Some(module_text) = node_text(&module, source) else {
        return;
    };

    // `from . import a, b` has no module of its own: each name is a sibling module.
    let bare_prefix = module.kind() == "relative_import" && module_text.chars().all(|c| c == '.');
    if !bare_prefix {
        if is_builtin_module(&module_text) {
            return;
        }
        imports.push(RawImport::new(
            module_text.clone(),
            confidence_for(&module_text),
            line,
        ));
        return;
    }

    let mut cursor = node.walk();
    let mut found = false;
    for name in node.children_by_field_name("name", &mut cursor) {
        if let Some(imported) = imported_name(&name, source) {
            let token = format!("{module_text}{imported}");
            imports.push(RawImport::new(token, Confidence::CertainSyntax, line));
            found = true;
        }
    }

    // `from . import *` refers to the package itself.
    if !found {
        imports.push(RawImport::new(module_text, Confidence::CertainSyntax, line));
    }
}

/// Module name from a `dotted_name` or `aliased_import` node.
fn imported_name(node: &Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "dotted_name" => node_text(node, source),
        "aliased_import" => {
            let name = node.child_by_field_name("name")?;
            node_text(&name, source)
        }
        _ => None,
    }
}

fn node_text(node: &Node, source: &[u8]) -> Option<String> {
    let text = node.utf8_text(source).ok()?;
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// `sys`, `os.path` → checks the top-level name; relative imports never match.
fn is_builtin_module(module: &str) -> bool {
    let top = module.split('.').next().unwrap_or(module);
    BUILTIN_MODULES.contains(&top)
}

/// Relative imports are project-local by syntax; bare names may be third-party.
fn confidence_for(module: &str) -> Confidence {
    if module.starts_with('.') {
        Confidence::CertainSyntax
    } else {
        Confidence::Heuristic
    }
}

fn first_error_position(node: &Node) -> Option<(usize, usize)> {
    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        return Some((pos.row, pos.column));
    }
    let count = node.child_count();
    for i in 0..count {
        if let Some(child) = node.child(i) {
            if child.has_error() {
                if let Some(pos) = first_error_position(&child) {
                    return Some(pos);
                }
            }
        }
    }
    None
}
