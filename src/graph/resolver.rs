//! Import resolution: maps raw import tokens to canonical file paths.
//!
//! A token becomes a certain dependency only when one of its candidate paths
//! is already a node in the graph or exists on disk. Everything else stays a
//! possible import, kept verbatim.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::types::{RawImport, Resolution};
use crate::fs::SourceFs;
use crate::parser::SupportedLanguage;
use crate::path::{normalize_with_base, CanonicalPath};

/// Resolve one raw import found in `source`.
///
/// The extractor's confidence tag is informational only: a heuristic token
/// that verifies on disk is still certain, and a syntax-certain token that
/// does not verify is still possible.
pub fn resolve(
    source: &CanonicalPath,
    import: &RawImport,
    known_paths: &BTreeSet<CanonicalPath>,
    fs: &dyn SourceFs,
) -> Resolution {
    let Some(language) = SupportedLanguage::from_path(source.as_path()) else {
        return Resolution::Possible(import.token.clone());
    };

    let source_dir = source.parent_dir();
    for candidate in candidates(language, &source_dir, &import.token) {
        if known_paths.contains(&candidate) || fs.file_exists(candidate.as_path()) {
            trace!(
                token = %import.token,
                confidence = %import.confidence,
                target = %candidate,
                "import resolved"
            );
            return Resolution::Certain(candidate);
        }
    }

    trace!(token = %import.token, confidence = %import.confidence, "import unresolved");
    Resolution::Possible(import.token.clone())
}

/// Candidate files for a token, in lookup order: as-is, then each suffix.
pub fn candidates(
    language: SupportedLanguage,
    source_dir: &Path,
    token: &str,
) -> Vec<CanonicalPath> {
    let base = match language {
        SupportedLanguage::Python => python_module_base(source_dir, token),
        SupportedLanguage::JavaScript | SupportedLanguage::TypeScript => {
            specifier_base(source_dir, token)
        }
    };
    let Some(base) = base else {
        return Vec::new();
    };

    // `from .. import *` names a package directory, never a module file.
    let package_only =
        language == SupportedLanguage::Python && token.trim_start_matches('.').is_empty();

    let base_str = base.to_string_lossy();
    let mut out = vec![normalize_with_base(&base, source_dir)];
    for suffix in language.resolution_suffixes() {
        if package_only && !suffix.starts_with('/') {
            continue;
        }
        let candidate = normalize_with_base(format!("{base_str}{suffix}"), source_dir);
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

/// `pkg.mod` → `<dir>/pkg/mod`; each leading dot past the first climbs one level.
fn python_module_base(source_dir: &Path, token: &str) -> Option<PathBuf> {
    let dots = token.chars().take_while(|&c| c == '.').count();
    let rest = &token[dots..];

    let mut base = source_dir.to_path_buf();
    for _ in 1..dots {
        base = base.parent()?.to_path_buf();
    }
    for part in rest.split('.').filter(|p| !p.is_empty()) {
        base.push(part);
    }
    if base == source_dir && dots == 0 {
        return None;
    }
    Some(base)
}

/// `./a/b` and `../c` resolve from the importing directory; absolute
/// specifiers stand on their own. Bare specifiers (`react`, `@scope/pkg`)
/// name packages, never files next to the importer.
fn specifier_base(source_dir: &Path, token: &str) -> Option<PathBuf> {
    let token = token.trim();
    if is_relative_specifier(token) {
        Some(source_dir.join(token))
    } else if token.starts_with('/') {
        Some(PathBuf::from(token))
    } else {
        None
    }
}

fn is_relative_specifier(token: &str) -> bool {
    matches!(token, "." | "..") || token.starts_with("./") || token.starts_with("../")
}
