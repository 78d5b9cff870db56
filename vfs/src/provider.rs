use std::io::{Cursor, Read};

use crate::VfsError;

/// Read access to a tree of named resources.
///
/// # Path Contract
///
/// Paths are normalized by the caller (see [`crate::path::normalize`]):
/// forward slashes, no leading or trailing slash, no `.` or `..` segments.
pub trait ResourceProvider {
    /// Read the entire contents of a resource.
    fn read(&self, path: &str) -> Result<Vec<u8>, VfsError>;

    /// Check whether a resource exists.
    fn exists(&self, path: &str) -> bool;

    /// Open a resource as a stream.
    ///
    /// The default implementation buffers [`read`](Self::read).
    fn open(&self, path: &str) -> Result<Box<dyn Read>, VfsError> {
        Ok(Box::new(Cursor::new(self.read(path)?)))
    }
}
