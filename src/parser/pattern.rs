//! Line-oriented import scanning for JavaScript and TypeScript.
//!
//! Recognizes ES module `import ... from "x"` / `export ... from "x"`,
//! side-effect `import "x"`, CommonJS `require("x")` and dynamic `import("x")`.
//! The scan does not understand comments, strings or conditionals, so every
//! token is tagged heuristic.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::graph::types::{Confidence, Extraction, RawImport};

static IMPORT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // import x from "y"; export { a } from "y"; } from "y"
        r#"\bfrom\s*['"]([^'"\n]+)['"]"#,
        // import "./polyfill"
        r#"^\s*import\s*['"]([^'"\n]+)['"]"#,
        // require("y")
        r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#,
        // import("y")
        r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#,
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Scan source text line by line. Duplicate specifiers are reported once.
pub fn extract_pattern_imports(source: &str) -> Extraction {
    let mut seen = HashSet::new();
    let mut imports = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        for pattern in IMPORT_PATTERNS.iter() {
            for caps in pattern.captures_iter(line) {
                let Some(m) = caps.get(1) else { continue };
                let token = m.as_str().trim();
                if token.is_empty() || !seen.insert(token.to_string()) {
                    continue;
                }
                imports.push(RawImport::new(token, Confidence::Heuristic, idx + 1));
            }
        }
    }

    Extraction {
        imports,
        failed: None,
    }
}
