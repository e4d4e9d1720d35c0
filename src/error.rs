//! Error types for FileRank.
//!
//! Every failure a transport can surface carries a stable `kind()` string so
//! callers get a structured response instead of a crash.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for FileRank operations.
pub type Result<T> = std::result::Result<T, FileRankError>;

/// Errors that can occur while maintaining or querying the model.
#[derive(Error, Debug)]
pub enum FileRankError {
    /// Path is unknown to both the graph and the ranking table.
    #[error("{path} not found in rankings or dependency graph")]
    NotFound { path: String },

    /// Source file does not exist on disk.
    #[error("file {path} not found on disk")]
    FileMissing { path: String },

    /// Source file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Source file is over the configured read limit.
    #[error("{path} is {size} bytes, over the {limit} byte limit")]
    TooLarge { path: String, size: u64, limit: u64 },

    /// Source file looks like binary content.
    #[error("{path} looks like a binary file")]
    Binary { path: String },

    /// Source could not be parsed.
    #[error("could not extract imports from {path}: {reason}")]
    ExtractionFailed { path: String, reason: String },

    /// Rank outside 1..=10.
    #[error("rank must be between 1 (most important) and 10 (least important), got {0}")]
    InvalidRank(i64),

    /// Malformed request parameters.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Reading or writing the persisted document failed.
    #[error("persistence error for '{path}': {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted document is not valid JSON for the model.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be used.
    #[error("config error in '{path}': {message}")]
    Config { path: PathBuf, message: String },
}

impl FileRankError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Stable machine-readable category, used in structured responses.
    pub fn kind(&self) -> &'static str {
        match self {
            FileRankError::NotFound { .. } => "not_found",
            FileRankError::FileMissing { .. }
            | FileRankError::Io { .. }
            | FileRankError::TooLarge { .. }
            | FileRankError::Binary { .. } => "io_error",
            FileRankError::ExtractionFailed { .. } => "extraction_failed",
            FileRankError::InvalidRank(_) | FileRankError::InvalidParams(_) => "invalid_input",
            FileRankError::Persistence { .. } | FileRankError::Json(_) => "persistence",
            FileRankError::Config { .. } => "config",
        }
    }

    /// `{ "error": kind, "message": display }` for transports.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        })
    }
}
