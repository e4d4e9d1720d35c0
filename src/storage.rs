//! Persistence for the model document.
//!
//! The service loads the whole document at startup and saves the whole
//! document after every mutating request.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::error::{FileRankError, Result};
use crate::model::Model;

/// Load/save contract for the model document.
pub trait Persistence {
    fn load(&self) -> Result<Model>;
    fn save(&self, model: &Model) -> Result<()>;
}

/// JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Persistence for JsonFileStore {
    fn load(&self) -> Result<Model> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(data_file = %self.path.display(), "no data file yet, starting empty");
                return Ok(Model::new());
            }
            Err(e) => return Err(FileRankError::persistence(&self.path, e)),
        };
        let model: Model = serde_json::from_str(&text)?;
        info!(
            data_file = %self.path.display(),
            files = model.files.len(),
            nodes = model.dependencies.len(),
            "model loaded"
        );
        Ok(model)
    }

    /// Write to a sibling temp file, then rename over the target.
    fn save(&self, model: &Model) -> Result<()> {
        let json = serde_json::to_string_pretty(model)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| FileRankError::persistence(parent, e))?;
        }

        let tmp = self.temp_path();
        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp);
            return Err(FileRankError::persistence(&self.path, e));
        }

        debug!(data_file = %self.path.display(), bytes = json.len(), "model saved");
        Ok(())
    }
}

/// Keeps the serialized document in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last saved document, if any.
    pub fn snapshot(&self) -> Option<String> {
        self.document.lock().ok().and_then(|doc| doc.clone())
    }
}

impl Persistence for MemoryStore {
    fn load(&self) -> Result<Model> {
        match self.snapshot() {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(Model::new()),
        }
    }

    fn save(&self, model: &Model) -> Result<()> {
        let json = serde_json::to_string(model)?;
        if let Ok(mut doc) = self.document.lock() {
            *doc = Some(json);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileRecord;
    use crate::path::normalize;

    fn sample() -> Model {
        let mut model = Model::new();
        model.files.insert(
            normalize("/p/a.py"),
            FileRecord {
                rank: Some(3),
                summary: Some("entry".into()),
            },
        );
        model
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("rankings.json"));
        assert_eq!(store.load().unwrap(), Model::new());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("rankings.json"));
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_corrupt_document_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rankings.json");
        fs::write(&path, "{not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert_eq!(err.kind(), "persistence");
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.snapshot().is_none());
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
    }
}
