//! Scratch catalog directories for unit tests.

use std::fs;
use std::path::{Path, PathBuf};

/// A directory under the system temp dir, removed on drop.
pub(crate) struct CatalogDir {
    path: PathBuf,
}

impl CatalogDir {
    pub(crate) fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "crafttree-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    /// Write `file` into the directory and return its full path.
    pub(crate) fn write(&self, file: &str, content: &str) -> PathBuf {
        let path = self.path.join(file);
        fs::write(&path, content).unwrap();
        path
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CatalogDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}
