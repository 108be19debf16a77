//! Finding the GIR file for a `<namespace>-<version>` key.

use crate::error::{GirError, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::debug;

/// Default system location of installed GIR files.
pub const DEFAULT_GIR_DIR: &str = "/usr/share/gir-1.0";

/// Resolves `"<namespace>-<version>"` (e.g. `"Gtk-3.0"`) to a file path.
pub trait GirLocator: Send + Sync {
    fn locate(&self, key: &str) -> Result<PathBuf>;
}

impl<T: GirLocator + ?Sized> GirLocator for Box<T> {
    fn locate(&self, key: &str) -> Result<PathBuf> {
        (**self).locate(key)
    }
}

pub fn namespace_key(namespace: &str, version: &str) -> String {
    format!("{namespace}-{version}")
}

impl GirLocator for HashMap<String, PathBuf> {
    fn locate(&self, key: &str) -> Result<PathBuf> {
        self.get(key).cloned().ok_or_else(|| GirError::NotFound {
            key: key.to_string(),
        })
    }
}

/// `*.gir` files found in a list of directories, keyed by file stem.
#[derive(Debug, Default, Clone)]
pub struct GirDirectory {
    files: BTreeMap<String, PathBuf>,
}

impl GirDirectory {
    /// Scan `dirs` for `*.gir` files (non-recursive). When the same key
    /// appears in several directories the first directory wins.
    pub fn scan(dirs: &[PathBuf]) -> Result<Self> {
        let mut files = BTreeMap::new();
        for dir in dirs {
            let escaped = glob::Pattern::escape(&dir.to_string_lossy());
            let pattern = format!("{escaped}/*.gir");
            let mut found = 0usize;
            for path in glob::glob(&pattern)?.filter_map(|r| r.ok()) {
                if !path.is_file() {
                    continue;
                }
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                found += 1;
                files.entry(stem.to_string()).or_insert_with(|| path.clone());
            }
            debug!(dir = %dir.display(), found, "scanned GIR directory");
        }
        Ok(GirDirectory { files })
    }

    /// Known `<namespace>-<version>` keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl GirLocator for GirDirectory {
    fn locate(&self, key: &str) -> Result<PathBuf> {
        self.files.locate(key)
    }
}

impl GirLocator for BTreeMap<String, PathBuf> {
    fn locate(&self, key: &str) -> Result<PathBuf> {
        self.get(key).cloned().ok_or_else(|| GirError::NotFound {
            key: key.to_string(),
        })
    }
}
