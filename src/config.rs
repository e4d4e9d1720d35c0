//! Configuration loaded from `<root>/.filerank/config.toml`.
//!
//! Every key is optional; a missing or unreadable file yields defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{FileRankError, Result};
use crate::graph::{DEFAULT_TREE_DEPTH, MAX_TREE_DEPTH};

/// Directory holding FileRank state inside a project.
pub const CONFIG_DIR: &str = ".filerank";

/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Resolve a project root to the single absolute form every entry point uses.
///
/// Symlinks are followed so a linked and a real root key files identically;
/// a root that does not exist yet falls back to lexical normalization.
pub fn resolve_root(root: &Path) -> PathBuf {
    match root.canonicalize() {
        Ok(real) => real,
        Err(e) => {
            debug!(root = %root.display(), error = %e, "root not canonicalizable, normalizing lexically");
            crate::path::normalize(root).as_path().to_path_buf()
        }
    }
}

/// FileRank settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRankConfig {
    /// Rankings/graph document. Relative paths resolve against the project root.
    pub data_file: PathBuf,
    /// Source files larger than this are skipped during extraction.
    pub max_file_bytes: u64,
    /// Depth used by `visualize_dependencies` when the caller gives none.
    pub default_tree_depth: usize,
    /// Largest depth a caller may request.
    pub max_tree_depth: usize,
}

impl Default for FileRankConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("file_rankings.json"),
            max_file_bytes: 1024 * 1024,
            default_tree_depth: DEFAULT_TREE_DEPTH,
            max_tree_depth: MAX_TREE_DEPTH,
        }
    }
}

impl FileRankConfig {
    /// Location of the config file for a project root.
    pub fn path_for(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load config, falling back to defaults on any problem.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(config = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "ignoring config file");
                Self::default()
            }
        }
    }

    /// Load config, reporting read and parse failures.
    pub fn try_load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| FileRankError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| FileRankError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.max_file_bytes == 0 {
            return Err(FileRankError::Config {
                path: path.to_path_buf(),
                message: "max_file_bytes must be greater than zero".into(),
            });
        }
        if self.default_tree_depth > self.max_tree_depth {
            return Err(FileRankError::Config {
                path: path.to_path_buf(),
                message: format!(
                    "default_tree_depth {} is over max_tree_depth {}",
                    self.default_tree_depth, self.max_tree_depth
                ),
            });
        }
        Ok(())
    }

    /// Absolute location of the data file for a project root.
    pub fn resolve_data_path(&self, root: &Path) -> PathBuf {
        if self.data_file.is_absolute() {
            self.data_file.clone()
        } else {
            root.join(&self.data_file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileRankConfig::load(&FileRankConfig::path_for(dir.path()));
        assert_eq!(config, FileRankConfig::default());
        assert_eq!(config.default_tree_depth, 3);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = FileRankConfig::path_for(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "max_file_bytes = 2048\n").unwrap();

        let config = FileRankConfig::load(&path);
        assert_eq!(config.max_file_bytes, 2048);
        assert_eq!(config.data_file, PathBuf::from("file_rankings.json"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_file_bytes = 0\n").unwrap();
        assert!(FileRankConfig::try_load(&path).is_err());
        assert_eq!(FileRankConfig::load(&path), FileRankConfig::default());

        std::fs::write(&path, "default_tree_depth = 8\nmax_tree_depth = 5\n").unwrap();
        assert!(FileRankConfig::try_load(&path).is_err());

        std::fs::write(&path, "default_tree_depth = \"deep\"\n").unwrap();
        assert!(matches!(
            FileRankConfig::try_load(&path),
            Err(FileRankError::Config { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_root_follows_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        let link = dir.path().join("link");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        assert_eq!(resolve_root(&link), resolve_root(&real));
        assert_eq!(resolve_root(&link.join(".")), resolve_root(&real));
    }

    #[test]
    fn test_resolve_root_missing_dir_is_lexical() {
        let dir = tempfile::tempdir().unwrap();
        let base = resolve_root(dir.path());
        let missing = resolve_root(&base.join("new").join("..").join("later"));
        assert_eq!(missing, base.join("later"));
    }

    #[test]
    fn test_resolve_data_path() {
        let config = FileRankConfig::default();
        assert_eq!(
            config.resolve_data_path(Path::new("/proj")),
            PathBuf::from("/proj/file_rankings.json")
        );
    }
}
