//! Language detection and extraction strategy selection.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tree_sitter::Language;

/// Languages with an import extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportedLanguage {
    Python,
    JavaScript,
    TypeScript,
}

/// How imports are pulled out of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Parse into a syntax tree and walk import statements.
    Syntax,
    /// Scan lines with import/require patterns.
    Pattern,
}

impl SupportedLanguage {
    /// Detect language from file extension. Unknown extensions yield `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "py" | "pyw" => Some(SupportedLanguage::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(SupportedLanguage::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(SupportedLanguage::TypeScript),
            _ => None,
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            SupportedLanguage::Python => Strategy::Syntax,
            SupportedLanguage::JavaScript | SupportedLanguage::TypeScript => Strategy::Pattern,
        }
    }

    /// Tree-sitter grammar, for languages parsed structurally.
    pub fn tree_sitter_language(&self) -> Option<Language> {
        match self {
            SupportedLanguage::Python => Some(tree_sitter_python::LANGUAGE.into()),
            SupportedLanguage::JavaScript | SupportedLanguage::TypeScript => None,
        }
    }

    /// Suffixes tried when resolving an import token to a file.
    pub fn resolution_suffixes(&self) -> &'static [&'static str] {
        match self {
            SupportedLanguage::Python => &[".py", "/__init__.py"],
            SupportedLanguage::JavaScript | SupportedLanguage::TypeScript => &[
                ".js",
                ".jsx",
                ".ts",
                ".tsx",
                ".mjs",
                ".cjs",
                "/index.js",
                "/index.jsx",
                "/index.ts",
                "/index.tsx",
            ],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SupportedLanguage::Python => "Python",
            SupportedLanguage::JavaScript => "JavaScript",
            SupportedLanguage::TypeScript => "TypeScript",
        }
    }
}
