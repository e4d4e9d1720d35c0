//! Path normalization: the identity key for every file in the model.
//!
//! A [`CanonicalPath`] is absolute, uses the platform separator, has no `.`
//! or `..` segments and no trailing separator. Normalization is purely
//! lexical: symlinks are not followed and the filesystem is never touched.

use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Normalized, unique string identity for a file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Directory containing this file.
    pub fn parent_dir(&self) -> PathBuf {
        self.as_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.as_path().to_path_buf())
    }

    /// True if this path lies under `dir` (component-wise, not string prefix).
    pub fn is_within(&self, dir: &CanonicalPath) -> bool {
        self.as_path().starts_with(dir.as_path())
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for CanonicalPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

/// Normalize `path` against the process working directory.
pub fn normalize(path: impl AsRef<Path>) -> CanonicalPath {
    let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from(MAIN_SEPARATOR.to_string()));
    normalize_with_base(path, &base)
}

/// Normalize `path`, resolving relative input against `base`.
pub fn normalize_with_base(path: impl AsRef<Path>, base: &Path) -> CanonicalPath {
    let unified = unify_separators(&path.as_ref().to_string_lossy());
    let candidate = PathBuf::from(unified);

    let joined = if candidate.is_absolute() {
        candidate
    } else {
        PathBuf::from(unify_separators(&base.to_string_lossy())).join(candidate)
    };

    CanonicalPath(joined.clean().to_string_lossy().into_owned())
}

fn unify_separators(raw: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        raw.replace('\\', "/")
    } else {
        raw.replace('/', "\\")
    }
}
