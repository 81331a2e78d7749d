//! Filesystem-backed source store

use super::SourceStore;
use crate::error::{MakerError, Result};
use crate::scaffold::destination::Layout;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A PrestaShop checkout (or module) on disk
#[derive(Debug, Clone)]
pub struct ProjectWorkspace {
    root: PathBuf,
    layout: Layout,
}

impl ProjectWorkspace {
    /// Workspace rooted at `root`, resolving classes through `layout`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, layout: Layout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    /// Project root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a class file
    #[must_use]
    pub fn class_file(&self, class: &str) -> Option<PathBuf> {
        self.layout.class_path(class).map(|path| self.root.join(path))
    }
}

impl SourceStore for ProjectWorkspace {
    fn class_exists(&self, class: &str) -> bool {
        self.class_file(class).is_some_and(|path| path.is_file())
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.root.join(path).is_file()
    }

    fn read_existing_source(&self, class: &str) -> Result<Option<String>> {
        let Some(path) = self.class_file(class) else {
            return Ok(None);
        };

        match fs::read_to_string(&path) {
            Ok(source) => Ok(Some(source)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(MakerError::io(path, err)),
        }
    }

    fn write_file(&mut self, path: &Path, content: &str) -> Result<()> {
        let full_path = self.root.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|err| MakerError::io(parent, err))?;
        }

        fs::write(&full_path, content).map_err(|err| MakerError::io(&full_path, err))?;
        tracing::debug!(path = %full_path.display(), bytes = content.len(), "Wrote file");
        Ok(())
    }
}
