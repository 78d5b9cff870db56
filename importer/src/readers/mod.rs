//! Built-in scene readers.

#[cfg(feature = "gltf")]
mod gltf;
mod obj;

#[cfg(feature = "gltf")]
pub use gltf::GltfReader;
pub use obj::ObjReader;

use sceneport_core::raw::RawScene;

use crate::error::ReaderError;
use crate::reader::{FormatInfo, LibraryVersion, SceneReader, SideFiles};

/// Dispatches to the format readers compiled into this crate by extension.
pub struct BuiltinReader {
    readers: Vec<Box<dyn SceneReader + Send + Sync>>,
}

impl BuiltinReader {
    pub fn new() -> Self {
        let mut readers: Vec<Box<dyn SceneReader + Send + Sync>> = vec![Box::new(ObjReader)];
        #[cfg(feature = "gltf")]
        readers.push(Box::new(GltfReader));
        Self { readers }
    }

    fn reader_for(&self, ext: &str) -> Option<&(dyn SceneReader + Send + Sync)> {
        self.readers
            .iter()
            .find(|r| r.formats().iter().any(|f| f.matches(ext)))
            .map(|r| r.as_ref())
    }
}

impl Default for BuiltinReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneReader for BuiltinReader {
    fn formats(&self) -> Vec<FormatInfo> {
        self.readers.iter().flat_map(|r| r.formats()).collect()
    }

    fn version(&self) -> LibraryVersion {
        LibraryVersion::current()
    }

    fn read_memory(
        &self,
        data: &[u8],
        format_hint: &str,
        side_files: &mut SideFiles<'_>,
    ) -> Result<RawScene, ReaderError> {
        let hint = format_hint.trim_start_matches('.');
        let reader = self
            .reader_for(hint)
            .ok_or_else(|| ReaderError::Unsupported(format_hint.to_string()))?;
        log::debug!("Reading {} bytes as '{hint}'", data.len());
        reader.read_memory(data, hint, side_files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_obj() {
        let reader = BuiltinReader::new();
        let formats = reader.formats();
        assert!(formats.iter().any(|f| f.matches("obj")));
        #[cfg(feature = "gltf")]
        assert!(formats.iter().any(|f| f.matches("glb")));
    }

    #[test]
    fn unknown_hint_is_unsupported() {
        let reader = BuiltinReader::new();
        let err = reader
            .read_memory(b"", "xyz", &mut |_: &str| None)
            .unwrap_err();
        assert!(matches!(err, ReaderError::Unsupported(_)));
    }
}
