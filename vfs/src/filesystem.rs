use std::path::{Path, PathBuf};

use crate::error::VfsError;
use crate::path::relative_path;
use crate::provider::ResourceProvider;

/// Provider reading files below a root directory.
///
/// Path traversal is prevented by [`crate::path::normalize`], which rejects
/// `..` segments before they reach the provider.
pub struct FileSystemProvider {
    root: PathBuf,
}

impl FileSystemProvider {
    /// Create a provider rooted at the given directory.
    ///
    /// The directory does not need to exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full filesystem path for a normalized resource path.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    /// Existing file at `path` relative to the root, `..` segments allowed.
    ///
    /// Used for side files written next to a scene, which may point into
    /// sibling directories. The [`ResourceProvider`] methods stay confined
    /// to the root.
    pub fn locate(&self, path: &str) -> Option<PathBuf> {
        let full_path = self.root.join(relative_path(path)?);
        full_path.is_file().then_some(full_path)
    }

    /// Read a file found by [`FileSystemProvider::locate`].
    pub fn read_relative(&self, path: &str) -> Result<Vec<u8>, VfsError> {
        let full_path = self
            .locate(path)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))?;
        log::trace!("Reading {}", full_path.display());
        Ok(std::fs::read(full_path)?)
    }
}

impl ResourceProvider for FileSystemProvider {
    fn read(&self, path: &str) -> Result<Vec<u8>, VfsError> {
        let full_path = self.resolve(path);
        log::trace!("Reading {}", full_path.display());
        Ok(std::fs::read(full_path)?)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }
}
