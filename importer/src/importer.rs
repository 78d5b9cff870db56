//! The import orchestrator.
//!
//! An [`Importer`] owns one [`SceneReader`] and at most one raw scene at a
//! time. Each import releases the previous scene first, so texture cache
//! entries and retained resolver streams never leak between imports.
//!
//! ```text
//! Ready ──read──▶ SceneLoaded ──convert/release──▶ SceneReleased ──read──▶ ...
//!   └──────────────────────── dispose ─────────────────────────▶ Disposed
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use sceneport_core::convert::{convert_scene, Triangulator};
use sceneport_core::material::TextureLoader;
use sceneport_core::raw::RawScene;
use sceneport_core::scene::SceneGraph;
use sceneport_vfs::path::extension;

use crate::error::ImportError;
use crate::reader::{FormatInfo, LibraryVersion, ResourceResolver, SceneReader, StreamFetcher};
use crate::settings::ImportSettings;
use crate::texture::{SceneTextureLoader, TextureCache, TextureDevice};

/// Callback receiving `(message, aux)` for every logged import problem.
pub type LogCallback = Box<dyn Fn(&str, &str)>;

/// Routes import diagnostics to `log` and the optional caller hook.
#[derive(Default)]
pub(crate) struct LogHook {
    callback: Option<LogCallback>,
}

impl LogHook {
    pub fn warn(&self, message: &str, aux: &str) {
        log::warn!("{message}");
        self.forward(message, aux);
    }

    pub fn error(&self, message: &str, aux: &str) {
        log::error!("{message}");
        self.forward(message, aux);
    }

    fn forward(&self, message: &str, aux: &str) {
        if let Some(callback) = &self.callback {
            callback(message, aux);
        }
    }
}

/// Lifecycle state of an [`Importer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImporterState {
    /// No raw scene has been loaded yet, or the last import failed.
    Ready,
    /// A raw scene is held, waiting for conversion.
    SceneLoaded,
    /// The last raw scene was converted or released.
    SceneReleased,
    /// Terminal; every operation fails with [`ImportError::Disposed`].
    Disposed,
}

/// Ticket for a raw scene loaded by [`Importer::read_raw_scene`].
///
/// Becomes stale once the scene is converted or released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawSceneHandle(u64);

struct LoadedScene {
    scene: RawScene,
    generation: u64,
    textures_dir: Option<PathBuf>,
}

struct FormatTable {
    formats: Vec<FormatInfo>,
    extensions: Vec<String>,
    version: LibraryVersion,
}

/// Builder for [`Importer`].
#[derive(Default)]
pub struct ImporterBuilder {
    reader: Option<Box<dyn SceneReader>>,
    device: Option<Box<dyn TextureDevice>>,
    texture_loader: Option<Box<dyn TextureLoader>>,
    settings: ImportSettings,
    triangulator: Option<Arc<dyn Triangulator>>,
    log_callback: Option<LogCallback>,
}

impl ImporterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene reader. Required.
    #[must_use]
    pub fn reader(mut self, reader: impl SceneReader + 'static) -> Self {
        self.reader = Some(Box::new(reader));
        self
    }

    /// Device creating textures for the default texture loader.
    #[must_use]
    pub fn device(mut self, device: impl TextureDevice + 'static) -> Self {
        self.device = Some(Box::new(device));
        self
    }

    /// Replace the default texture loader entirely.
    #[must_use]
    pub fn texture_loader(mut self, loader: impl TextureLoader + 'static) -> Self {
        self.texture_loader = Some(Box::new(loader));
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: ImportSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Polygon triangulator taking precedence over the process-wide override.
    #[must_use]
    pub fn triangulator(mut self, triangulator: Arc<dyn Triangulator>) -> Self {
        self.triangulator = Some(triangulator);
        self
    }

    #[must_use]
    pub fn log_callback(mut self, callback: impl Fn(&str, &str) + 'static) -> Self {
        self.log_callback = Some(Box::new(callback));
        self
    }

    /// Build the importer.
    ///
    /// Fails with [`ImportError::Configuration`] without a reader, or without
    /// both a texture device and a texture loader.
    pub fn build(self) -> Result<Importer, ImportError> {
        let reader = self
            .reader
            .ok_or_else(|| ImportError::Configuration("a scene reader is required".into()))?;
        if self.device.is_none() && self.texture_loader.is_none() {
            return Err(ImportError::Configuration(
                "a texture device or a texture loader is required".into(),
            ));
        }

        log::debug!("Importer ready");
        Ok(Importer {
            reader,
            device: self.device,
            texture_loader: self.texture_loader,
            settings: self.settings,
            triangulator: self.triangulator,
            state: ImporterState::Ready,
            loaded: None,
            generation: 0,
            textures: TextureCache::new(),
            retained: Vec::new(),
            formats: OnceLock::new(),
            log: LogHook {
                callback: self.log_callback,
            },
        })
    }
}

/// Converts scene files and streams into [`SceneGraph`]s.
pub struct Importer {
    reader: Box<dyn SceneReader>,
    device: Option<Box<dyn TextureDevice>>,
    texture_loader: Option<Box<dyn TextureLoader>>,
    settings: ImportSettings,
    triangulator: Option<Arc<dyn Triangulator>>,
    state: ImporterState,
    loaded: Option<LoadedScene>,
    generation: u64,
    textures: TextureCache,
    retained: Vec<Box<dyn Read>>,
    formats: OnceLock<FormatTable>,
    log: LogHook,
}

impl Importer {
    pub fn builder() -> ImporterBuilder {
        ImporterBuilder::new()
    }

    /// Importer with the built-in readers and `image` decoding.
    #[cfg(feature = "image")]
    pub fn with_defaults(settings: ImportSettings) -> Result<Self, ImportError> {
        Self::builder()
            .reader(crate::readers::BuiltinReader::new())
            .device(crate::texture::ImageDecoder::new())
            .settings(settings)
            .build()
    }

    /// Current lifecycle state. Available after disposal.
    pub fn state(&self) -> ImporterState {
        self.state
    }

    pub fn settings(&self) -> Result<&ImportSettings, ImportError> {
        self.ensure_alive()?;
        Ok(&self.settings)
    }

    pub fn set_log_callback(
        &mut self,
        callback: impl Fn(&str, &str) + 'static,
    ) -> Result<(), ImportError> {
        self.ensure_alive()?;
        self.log.callback = Some(Box::new(callback));
        Ok(())
    }

    /// Import a scene file.
    ///
    /// Textures resolve against `textures_dir`, then the configured textures
    /// directory, then the file's own directory. Unsupported extensions and
    /// reader failures are logged and yield `Ok(None)`.
    pub fn read_scene(
        &mut self,
        path: impl AsRef<Path>,
        textures_dir: Option<&Path>,
    ) -> Result<Option<SceneGraph>, ImportError> {
        self.ensure_alive()?;
        self.release();
        let path = path.as_ref();
        let display = path.display().to_string();

        if !self.supports(&extension(&display).unwrap_or_default()) {
            self.fail(&format!("Unsupported file format: {display}"), &display);
            return Ok(None);
        }

        let scene = match self.reader.read_file(path) {
            Ok(scene) => scene,
            Err(e) => {
                self.log
                    .error(&format!("Failed to import {display}: {e}"), &display);
                self.state = ImporterState::Ready;
                return Ok(None);
            }
        };

        let textures_dir = textures_dir
            .map(Path::to_path_buf)
            .or_else(|| self.settings.textures_dir.clone())
            .or_else(|| path.parent().map(Path::to_path_buf));
        self.store(scene, textures_dir);
        self.convert_loaded(None).map(Some)
    }

    /// Import a scene from a byte stream.
    ///
    /// `format_hint` is the file extension, with or without the dot. Side
    /// files and textures are requested from `resolver`; its streams are
    /// dropped after reading unless `auto_close` is false, in which case they
    /// stay open until the scene is released.
    pub fn read_scene_from_stream(
        &mut self,
        mut stream: impl Read,
        format_hint: &str,
        resolver: Option<&dyn ResourceResolver>,
        auto_close: bool,
    ) -> Result<SceneGraph, ImportError> {
        self.ensure_alive()?;
        self.release();
        let hint = normalize_extension(format_hint);

        if !self.supports(&hint) {
            self.fail(&format!("Unsupported format hint: {format_hint}"), format_hint);
            return Err(ImportError::UnsupportedFormat(format_hint.to_string()));
        }

        let mut data = Vec::new();
        if let Err(e) = stream.read_to_end(&mut data) {
            self.fail(&format!("Failed to read input stream: {e}"), format_hint);
            return Err(e.into());
        }

        let result = {
            let mut fetcher = resolver.map(|resolver| StreamFetcher {
                resolver,
                auto_close,
                retained: &mut self.retained,
            });
            let mut side_files = |name: &str| fetcher.as_mut().and_then(|f| f.fetch(name));
            self.reader.read_memory(&data, &hint, &mut side_files)
        };

        let scene = match result {
            Ok(scene) => scene,
            Err(e) => {
                self.fail(&format!("Failed to import {hint} stream: {e}"), format_hint);
                return Err(e.into());
            }
        };

        let textures_dir = self.settings.textures_dir.clone();
        self.store(scene, textures_dir);
        self.convert_loaded(resolver.map(|r| (r, auto_close)))
    }

    /// Load a scene without converting it.
    pub fn read_raw_scene(&mut self, path: impl AsRef<Path>) -> Result<RawSceneHandle, ImportError> {
        self.ensure_alive()?;
        self.release();
        let path = path.as_ref();
        let display = path.display().to_string();

        let ext = extension(&display).unwrap_or_default();
        if !self.supports(&ext) {
            self.fail(&format!("Unsupported file format: {display}"), &display);
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let scene = match self.reader.read_file(path) {
            Ok(scene) => scene,
            Err(e) => {
                self.fail(&format!("Failed to import {display}: {e}"), &display);
                return Err(e.into());
            }
        };

        let textures_dir = self
            .settings
            .textures_dir
            .clone()
            .or_else(|| path.parent().map(Path::to_path_buf));
        Ok(self.store(scene, textures_dir))
    }

    /// Inspect a scene loaded by [`Importer::read_raw_scene`].
    pub fn raw_scene(&self, handle: RawSceneHandle) -> Result<&RawScene, ImportError> {
        self.ensure_alive()?;
        match &self.loaded {
            Some(loaded) if loaded.generation == handle.0 => Ok(&loaded.scene),
            _ => Err(ImportError::StaleHandle),
        }
    }

    /// Convert a scene loaded by [`Importer::read_raw_scene`] and release it.
    pub fn convert_raw_scene(&mut self, handle: RawSceneHandle) -> Result<SceneGraph, ImportError> {
        self.raw_scene(handle)?;
        self.convert_loaded(None)
    }

    /// Drop the raw scene, the texture cache and any retained streams.
    pub fn release_scene(&mut self) -> Result<(), ImportError> {
        self.ensure_alive()?;
        self.release();
        Ok(())
    }

    /// Release everything and disable the importer.
    pub fn dispose(&mut self) -> Result<(), ImportError> {
        self.ensure_alive()?;
        self.release();
        self.state = ImporterState::Disposed;
        log::debug!("Importer disposed");
        Ok(())
    }

    /// Whether `ext` names a supported format. Case-insensitive, the leading
    /// dot is optional.
    pub fn is_format_supported(&self, ext: &str) -> Result<bool, ImportError> {
        self.ensure_alive()?;
        Ok(self.supports(&normalize_extension(ext)))
    }

    pub fn supported_extensions(&self) -> Result<&[String], ImportError> {
        self.ensure_alive()?;
        Ok(&self.format_table().extensions)
    }

    pub fn supported_formats(&self) -> Result<&[FormatInfo], ImportError> {
        self.ensure_alive()?;
        Ok(&self.format_table().formats)
    }

    pub fn library_version(&self) -> Result<LibraryVersion, ImportError> {
        self.ensure_alive()?;
        Ok(self.format_table().version)
    }

    /// Textures cached since the last release.
    pub fn cached_texture_count(&self) -> Result<usize, ImportError> {
        self.ensure_alive()?;
        Ok(self.textures.len())
    }

    fn ensure_alive(&self) -> Result<(), ImportError> {
        if self.state == ImporterState::Disposed {
            return Err(ImportError::Disposed);
        }
        Ok(())
    }

    fn format_table(&self) -> &FormatTable {
        self.formats.get_or_init(|| {
            let formats = self.reader.formats();
            let mut extensions: Vec<String> = Vec::new();
            for ext in formats.iter().flat_map(|f| f.extensions.iter()) {
                if !extensions.contains(ext) {
                    extensions.push(ext.clone());
                }
            }
            FormatTable {
                formats,
                extensions,
                version: self.reader.version(),
            }
        })
    }

    fn supports(&self, ext: &str) -> bool {
        !ext.is_empty()
            && self
                .format_table()
                .extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext))
    }

    fn fail(&mut self, message: &str, aux: &str) {
        self.log.error(message, aux);
        self.state = ImporterState::Ready;
    }

    fn store(&mut self, scene: RawScene, textures_dir: Option<PathBuf>) -> RawSceneHandle {
        self.generation += 1;
        log::debug!(
            "Loaded raw scene: {} nodes, {} meshes, {} materials",
            scene.root.subtree_len(),
            scene.meshes.len(),
            scene.materials.len()
        );
        self.loaded = Some(LoadedScene {
            scene,
            generation: self.generation,
            textures_dir,
        });
        self.state = ImporterState::SceneLoaded;
        RawSceneHandle(self.generation)
    }

    fn release(&mut self) {
        if self.loaded.take().is_some() {
            log::trace!("Released raw scene {}", self.generation);
        }
        self.textures.clear();
        self.retained.clear();
        if self.state != ImporterState::Ready {
            self.state = ImporterState::SceneReleased;
        }
    }

    /// Convert the loaded raw scene, then drop it. The texture cache and
    /// retained streams live on until the next release.
    fn convert_loaded(
        &mut self,
        streams: Option<(&dyn ResourceResolver, bool)>,
    ) -> Result<SceneGraph, ImportError> {
        let loaded = self.loaded.as_ref().ok_or(ImportError::StaleHandle)?;

        let mut settings = self.settings.convert_settings();
        if let Some(triangulator) = &self.triangulator {
            settings = settings.with_triangulator(Arc::clone(triangulator));
        }

        let graph = match self.texture_loader.as_deref_mut() {
            Some(loader) => convert_scene(&loaded.scene, &settings, loader),
            None => {
                let device = self.device.as_deref().ok_or_else(|| {
                    ImportError::Configuration("no texture device configured".into())
                })?;
                let cache = if self.settings.cache_textures {
                    Some(&mut self.textures)
                } else {
                    None
                };
                let mut loader = SceneTextureLoader {
                    cache,
                    device,
                    streams: streams.map(|(resolver, auto_close)| StreamFetcher {
                        resolver,
                        auto_close,
                        retained: &mut self.retained,
                    }),
                    textures_dir: loaded.textures_dir.as_deref(),
                    log: &self.log,
                };
                convert_scene(&loaded.scene, &settings, &mut loader)
            }
        };

        self.loaded = None;
        self.state = ImporterState::SceneReleased;
        Ok(graph)
    }
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("cached_textures", &self.textures.len())
            .field("retained_streams", &self.retained.len())
            .finish()
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReaderError, TextureError};
    use crate::reader::SideFiles;
    use sceneport_core::raw::{RawMesh, RawNode};
    use rstest::rstest;
    use sceneport_core::texture::CpuTexture;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Reader producing a single triangle, or failing on demand.
    struct StubReader {
        fail: bool,
    }

    impl SceneReader for StubReader {
        fn formats(&self) -> Vec<FormatInfo> {
            vec![FormatInfo::new("Stub", &["stub", "STB"])]
        }

        fn version(&self) -> LibraryVersion {
            LibraryVersion::new(2, 1, -3)
        }

        fn read_memory(
            &self,
            _data: &[u8],
            _format_hint: &str,
            _side_files: &mut SideFiles<'_>,
        ) -> Result<RawScene, ReaderError> {
            if self.fail {
                return Err(ReaderError::Parse("broken".into()));
            }
            let mesh = RawMesh::new()
                .with_positions(vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
                .with_faces(vec![vec![0, 1, 2]]);
            Ok(RawScene::new()
                .with_root(RawNode::new().with_name("Tri").with_meshes(vec![0]))
                .with_meshes(vec![mesh]))
        }
    }

    struct NullDevice;

    impl TextureDevice for NullDevice {
        fn create_texture(&self, name: &str, _data: &[u8]) -> Result<CpuTexture, TextureError> {
            Err(TextureError::NotFound(name.into()))
        }
    }

    fn importer(fail: bool) -> Importer {
        Importer::builder()
            .reader(StubReader { fail })
            .device(NullDevice)
            .build()
            .unwrap()
    }

    #[test]
    fn builder_requires_reader_and_device() {
        let err = Importer::builder().device(NullDevice).build().unwrap_err();
        assert!(matches!(err, ImportError::Configuration(_)));
        let err = Importer::builder()
            .reader(StubReader { fail: false })
            .build()
            .unwrap_err();
        assert!(matches!(err, ImportError::Configuration(_)));
    }

    #[rstest]
    #[case("stub", true)]
    #[case(".STUB", true)]
    #[case(" stb", true)]
    #[case("obj", false)]
    #[case("", false)]
    #[case(".", false)]
    fn format_checks_normalize_extension(#[case] ext: &str, #[case] supported: bool) {
        assert_eq!(importer(false).is_format_supported(ext).unwrap(), supported);
    }

    #[test]
    fn introspection_is_cached_from_reader() {
        let importer = importer(false);
        assert_eq!(importer.supported_extensions().unwrap(), ["stub", "stb"]);
        assert_eq!(importer.supported_formats().unwrap()[0].name, "Stub");
        assert_eq!(importer.library_version().unwrap(), LibraryVersion::new(2, 1, 0));
    }

    #[test]
    fn stream_import_runs_pipeline() {
        let mut importer = importer(false);
        let graph = importer
            .read_scene_from_stream(&b"ignored"[..], ".stub", None, true)
            .unwrap();
        assert_eq!(graph.root.name, "Tri");
        assert!(graph.root.is_leaf());
        assert_eq!(importer.state(), ImporterState::SceneReleased);
    }

    #[test]
    fn stream_failures_are_errors_and_logged() {
        let messages = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&messages);
        let mut importer = importer(true);
        importer
            .set_log_callback(move |msg: &str, aux: &str| {
                sink.borrow_mut().push((msg.to_string(), aux.to_string()))
            })
            .unwrap();

        let err = importer
            .read_scene_from_stream(&b""[..], "obj", None, true)
            .unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
        let err = importer
            .read_scene_from_stream(&b""[..], "stub", None, true)
            .unwrap_err();
        assert!(matches!(err, ImportError::Reader(_)));

        assert_eq!(importer.state(), ImporterState::Ready);
        let messages = messages.borrow();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].1, "obj");
    }

    #[test]
    fn handles_go_stale_after_conversion() {
        let dir = std::env::temp_dir().join(format!("sceneport-raw-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scene.stub");
        std::fs::write(&path, b"x").unwrap();

        let mut importer = importer(false);
        let handle = importer.read_raw_scene(&path).unwrap();
        assert_eq!(importer.state(), ImporterState::SceneLoaded);
        assert_eq!(importer.raw_scene(handle).unwrap().meshes.len(), 1);

        let graph = importer.convert_raw_scene(handle).unwrap();
        assert_eq!(graph.root.name, "Tri");
        assert!(matches!(importer.raw_scene(handle), Err(ImportError::StaleHandle)));
        assert!(matches!(
            importer.convert_raw_scene(handle),
            Err(ImportError::StaleHandle)
        ));

        let second = importer.read_raw_scene(&path).unwrap();
        assert_ne!(handle, second);
        importer.release_scene().unwrap();
        assert!(matches!(importer.raw_scene(second), Err(ImportError::StaleHandle)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn dispose_is_terminal() {
        let mut importer = importer(false);
        importer.dispose().unwrap();
        assert_eq!(importer.state(), ImporterState::Disposed);
        assert!(matches!(importer.dispose(), Err(ImportError::Disposed)));
        assert!(matches!(importer.is_format_supported("stub"), Err(ImportError::Disposed)));
    }
}
