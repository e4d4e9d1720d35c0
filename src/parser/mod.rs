//! Import extraction, dispatched on file extension.
//!
//! Python goes through tree-sitter; JavaScript and TypeScript through the
//! line scanner; anything else yields an empty extraction.

pub mod language;
pub mod pattern;
pub mod python;

use std::path::Path;

use tracing::trace;

pub use language::{Strategy, SupportedLanguage};

use crate::graph::types::Extraction;

/// Extract raw import tokens from `source`, choosing the extractor by the
/// extension of `path`.
pub fn extract_imports(path: &Path, source: &str) -> Extraction {
    let Some(language) = SupportedLanguage::from_path(path) else {
        return Extraction::empty();
    };

    let extraction = match language.strategy() {
        Strategy::Syntax => python::extract_python_imports(source),
        Strategy::Pattern => pattern::extract_pattern_imports(source),
    };
    trace!(
        file = %path.display(),
        language = language.name(),
        imports = extraction.imports.len(),
        "imports extracted"
    );
    extraction
}
