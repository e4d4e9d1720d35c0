//! Filesystem collaborators used by the core.
//!
//! The service never touches `std::fs` directly; it goes through
//! [`SourceFs`] so tests can substitute an in-memory tree.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{FileRankError, Result};

/// Bytes inspected when sniffing for binary content.
const BINARY_SNIFF_LEN: usize = 8 * 1024;

/// Read access to source files.
pub trait SourceFs {
    /// Read a file as UTF-8 text (lossy), subject to the size guard.
    fn read_file_text(&self, path: &Path) -> Result<String>;

    /// True if `path` is an existing regular file.
    fn file_exists(&self, path: &Path) -> bool;
}

/// The real filesystem, with a bounded-size guard on reads.
#[derive(Debug, Clone)]
pub struct DiskFs {
    max_file_bytes: u64,
}

impl DiskFs {
    pub fn new(max_file_bytes: u64) -> Self {
        Self { max_file_bytes }
    }
}

impl SourceFs for DiskFs {
    fn read_file_text(&self, path: &Path) -> Result<String> {
        let shown = path.display().to_string();
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FileRankError::FileMissing {
                path: shown.clone(),
            },
            _ => FileRankError::io(shown.clone(), e),
        })?;

        if !metadata.is_file() {
            return Err(FileRankError::FileMissing { path: shown });
        }
        let too_large = |size| FileRankError::TooLarge {
            path: shown.clone(),
            size,
            limit: self.max_file_bytes,
        };
        if metadata.len() > self.max_file_bytes {
            return Err(too_large(metadata.len()));
        }

        // The file may have grown since the metadata call.
        let bytes = fs::File::open(path)
            .and_then(|f| read_bounded(f, self.max_file_bytes))
            .map_err(|e| FileRankError::io(shown.clone(), e))?
            .ok_or_else(|| too_large(self.max_file_bytes + 1))?;

        if looks_binary(&bytes) {
            return Err(FileRankError::Binary { path: shown });
        }

        trace!(file = %shown, bytes = bytes.len(), "read source file");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Read at most `limit` bytes; `None` if the source holds more.
fn read_bounded(reader: impl Read, limit: u64) -> std::io::Result<Option<Vec<u8>>> {
    let mut bytes = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > limit {
        Ok(None)
    } else {
        Ok(Some(bytes))
    }
}

fn looks_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0)
}

/// An in-memory file tree keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn remove(&mut self, path: &Path) {
        self.files.remove(path);
    }
}

impl SourceFs for MemoryFs {
    fn read_file_text(&self, path: &Path) -> Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FileRankError::FileMissing {
                path: path.display().to_string(),
            })
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}
