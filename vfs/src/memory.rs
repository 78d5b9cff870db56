use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::VfsError;
use crate::provider::ResourceProvider;

/// In-memory provider for tests and embedded assets.
///
/// Cheap to clone; clones share the same storage.
///
/// # Example
///
/// ```ignore
/// let mem = MemoryProvider::new();
/// mem.insert("textures/brick.png", png_bytes);
/// assert!(mem.exists("textures/brick.png"));
/// ```
#[derive(Clone, Default)]
pub struct MemoryProvider {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryProvider {
    /// Create an empty in-memory provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource, overwriting any existing entry at the same path.
    pub fn insert(&self, path: impl Into<String>, data: Vec<u8>) {
        self.files.write().insert(path.into(), data);
    }

    /// Remove a resource, returning its data if it existed.
    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.files.write().remove(path)
    }

    /// Number of stored resources.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceProvider for MemoryProvider {
    fn read(&self, path: &str) -> Result<Vec<u8>, VfsError> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| VfsError::NotFound(path.to_owned()))
    }

    fn exists(&self, path: &str) -> bool {
        self.files.read().contains_key(path)
    }
}
