//! Scene reader and resource resolver interfaces.

use std::io::Read;
use std::path::Path;

use sceneport_core::raw::RawScene;
use sceneport_vfs::path::{clean_resource_path, extension, normalize};
use sceneport_vfs::{FileSystemProvider, ResourceProvider};

use crate::error::ReaderError;

/// A file format a reader understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatInfo {
    /// Human-readable name, e.g. `Wavefront OBJ`.
    pub name: String,
    /// Lower-case extensions without the dot.
    pub extensions: Vec<String>,
}

impl FormatInfo {
    pub fn new(name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
        }
    }

    /// Whether `ext` (no dot, any case) belongs to this format.
    pub fn matches(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Version of the library behind a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LibraryVersion {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
}

impl LibraryVersion {
    /// Build a version; negative revisions are clamped to zero.
    pub fn new(major: u32, minor: u32, revision: i64) -> Self {
        Self {
            major,
            minor,
            revision: revision.clamp(0, u32::MAX as i64) as u32,
        }
    }

    /// Version of this crate.
    pub fn current() -> Self {
        let part = |s: &str| s.parse::<u32>().unwrap_or(0);
        Self::new(
            part(env!("CARGO_PKG_VERSION_MAJOR")),
            part(env!("CARGO_PKG_VERSION_MINOR")),
            env!("CARGO_PKG_VERSION_PATCH").parse::<i64>().unwrap_or(0),
        )
    }
}

impl std::fmt::Display for LibraryVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

/// Callback used by readers to fetch side files (material libraries,
/// external buffers) by the name written in the scene file.
pub type SideFiles<'a> = dyn FnMut(&str) -> Option<Vec<u8>> + 'a;

/// Parses scene files into a [`RawScene`].
pub trait SceneReader {
    /// Formats this reader handles.
    fn formats(&self) -> Vec<FormatInfo>;

    /// Version of the underlying library.
    fn version(&self) -> LibraryVersion;

    /// Parse an in-memory scene. `format_hint` is the lower-case extension.
    fn read_memory(
        &self,
        data: &[u8],
        format_hint: &str,
        side_files: &mut SideFiles<'_>,
    ) -> Result<RawScene, ReaderError>;

    /// Parse a scene file. Side files resolve relative to its directory.
    ///
    /// An unnamed root node is named after the file stem.
    fn read_file(&self, path: &Path) -> Result<RawScene, ReaderError> {
        let data = std::fs::read(path)?;
        let hint = extension(&path.to_string_lossy()).unwrap_or_default();
        let dir = FileSystemProvider::new(path.parent().unwrap_or_else(|| Path::new(".")));
        let mut side_files = |name: &str| {
            match dir.read_relative(clean_resource_path(name)) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    log::warn!("Side file '{name}' not loaded: {e}");
                    None
                }
            }
        };

        let mut scene = self.read_memory(&data, &hint, &mut side_files)?;
        if scene.root.name.is_empty() {
            if let Some(stem) = path.file_stem() {
                scene.root.name = stem.to_string_lossy().into_owned();
            }
        }
        Ok(scene)
    }
}

/// Caller-supplied lookup for files referenced by a stream-imported scene.
pub trait ResourceResolver {
    /// Open `name` as written in the scene file, or `None` if unavailable.
    fn resolve(&self, name: &str) -> Option<Box<dyn Read>>;
}

impl<F> ResourceResolver for F
where
    F: Fn(&str) -> Option<Box<dyn Read>>,
{
    fn resolve(&self, name: &str) -> Option<Box<dyn Read>> {
        self(name)
    }
}

/// Resolver backed by a [`ResourceProvider`].
///
/// Names are cleaned and normalized before lookup.
pub struct ProviderResolver<P>(pub P);

impl<P: ResourceProvider> ResourceResolver for ProviderResolver<P> {
    fn resolve(&self, name: &str) -> Option<Box<dyn Read>> {
        let path = normalize(clean_resource_path(name)).ok()?;
        self.0.open(&path).ok()
    }
}

/// Reads resolver streams to the end, keeping them open when asked to.
pub(crate) struct StreamFetcher<'a> {
    pub resolver: &'a dyn ResourceResolver,
    pub auto_close: bool,
    pub retained: &'a mut Vec<Box<dyn Read>>,
}

impl StreamFetcher<'_> {
    pub fn fetch(&mut self, name: &str) -> Option<Vec<u8>> {
        let mut stream = self.resolver.resolve(name)?;
        let mut bytes = Vec::new();
        if let Err(e) = stream.read_to_end(&mut bytes) {
            log::warn!("Failed to read resource '{name}': {e}");
            return None;
        }
        if !self.auto_close {
            self.retained.push(stream);
        }
        Some(bytes)
    }
}
