//! Texture devices, the per-import texture cache and the default loader.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use sceneport_core::material::{ConvertedMaterial, TextureLoader, WrapMode};
use sceneport_core::texture::CpuTexture;
#[cfg(feature = "image")]
use sceneport_core::texture::TextureFormat;
use sceneport_vfs::path::{clean_resource_path, file_name};
use sceneport_vfs::FileSystemProvider;

use crate::error::TextureError;
use crate::importer::LogHook;
use crate::reader::StreamFetcher;

/// Turns encoded image bytes into a texture.
pub trait TextureDevice {
    fn create_texture(&self, name: &str, data: &[u8]) -> Result<CpuTexture, TextureError>;
}

/// Decodes any format the `image` crate understands into RGBA8.
#[cfg(feature = "image")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageDecoder {
    format: TextureFormat,
}

#[cfg(feature = "image")]
impl ImageDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag decoded textures with `format` instead of sRGB.
    #[must_use]
    pub fn with_format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }
}

#[cfg(feature = "image")]
impl TextureDevice for ImageDecoder {
    fn create_texture(&self, name: &str, data: &[u8]) -> Result<CpuTexture, TextureError> {
        let img = image::load_from_memory(data).map_err(|e| TextureError::Decode {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(CpuTexture::new(name, width, height, rgba.into_raw()).with_format(self.format))
    }
}

/// Textures created during the current import, keyed by filename.
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<String, Arc<CpuTexture>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, filename: &str) -> Option<Arc<CpuTexture>> {
        self.entries.get(filename).cloned()
    }

    pub fn insert(&mut self, filename: impl Into<String>, texture: Arc<CpuTexture>) {
        self.entries.insert(filename.into(), texture);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The importer's loader for one conversion.
///
/// Lookup order: cache, caller resolver, textures directory. A relative
/// path that cannot be opened under the textures directory is retried by
/// its bare file name.
pub(crate) struct SceneTextureLoader<'a> {
    pub cache: Option<&'a mut TextureCache>,
    pub device: &'a dyn TextureDevice,
    pub streams: Option<StreamFetcher<'a>>,
    pub textures_dir: Option<&'a Path>,
    pub log: &'a LogHook,
}

impl SceneTextureLoader<'_> {
    fn fetch(&mut self, filename: &str) -> Result<Vec<u8>, TextureError> {
        let cleaned = clean_resource_path(filename);

        if let Some(streams) = self.streams.as_mut() {
            let found = streams.fetch(filename).or_else(|| {
                if cleaned != filename {
                    streams.fetch(cleaned)
                } else {
                    None
                }
            });
            if let Some(bytes) = found {
                return Ok(bytes);
            }
        }

        if let Some(dir) = self.textures_dir {
            let provider = FileSystemProvider::new(dir);
            let candidates = std::iter::once(cleaned).chain(file_name(cleaned));
            for candidate in candidates {
                if provider.locate(candidate).is_some() {
                    return Ok(provider.read_relative(candidate)?);
                }
            }
        }

        Err(TextureError::NotFound(filename.to_string()))
    }
}

impl TextureLoader for SceneTextureLoader<'_> {
    fn load_texture(
        &mut self,
        material: &mut ConvertedMaterial,
        filename: &str,
        wrap_mode: (WrapMode, WrapMode),
        _blend_factor: f32,
    ) {
        if let Some(texture) = self.cache.as_ref().and_then(|c| c.get(filename)) {
            log::trace!("Texture cache hit: {filename}");
            material.texture = Some(texture);
            return;
        }

        let created = self
            .fetch(filename)
            .and_then(|bytes| self.device.create_texture(filename, &bytes));
        match created {
            Ok(texture) => {
                log::debug!(
                    "Loaded texture {filename} ({}x{}, wrap {:?})",
                    texture.width,
                    texture.height,
                    wrap_mode
                );
                let texture = Arc::new(texture);
                if let Some(cache) = self.cache.as_mut() {
                    cache.insert(filename, Arc::clone(&texture));
                }
                material.texture = Some(texture);
            }
            Err(e) => self
                .log
                .warn(&format!("Texture not loaded for material '{}': {e}", material.name), filename),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Device that accepts any bytes as a 1x1 texture and counts calls.
    #[derive(Default)]
    struct CountingDevice {
        calls: Cell<usize>,
    }

    impl TextureDevice for CountingDevice {
        fn create_texture(&self, name: &str, data: &[u8]) -> Result<CpuTexture, TextureError> {
            self.calls.set(self.calls.get() + 1);
            if data.is_empty() {
                return Err(TextureError::Decode {
                    name: name.into(),
                    reason: "empty".into(),
                });
            }
            Ok(CpuTexture::new(name, 1, 1, vec![0; 4]))
        }
    }

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("sceneport-tex-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("maps")).unwrap();
        dir
    }

    fn load(loader: &mut SceneTextureLoader<'_>, filename: &str) -> ConvertedMaterial {
        let mut mat = ConvertedMaterial::new().with_name("m");
        loader.load_texture(&mut mat, filename, (WrapMode::Wrap, WrapMode::Wrap), 1.0);
        mat
    }

    #[test]
    fn cache_shares_one_texture() {
        let dir = temp_dir("cache");
        std::fs::write(dir.join("brick.png"), b"px").unwrap();
        let device = CountingDevice::default();
        let mut cache = TextureCache::new();
        let log = LogHook::default();
        let mut loader = SceneTextureLoader {
            cache: Some(&mut cache),
            device: &device,
            streams: None,
            textures_dir: Some(&dir),
            log: &log,
        };

        let a = load(&mut loader, "brick.png");
        let b = load(&mut loader, "brick.png");
        assert!(Arc::ptr_eq(a.texture.as_ref().unwrap(), b.texture.as_ref().unwrap()));
        assert_eq!(device.calls.get(), 1);
        assert_eq!(cache.len(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn disabled_cache_creates_each_time() {
        let dir = temp_dir("nocache");
        std::fs::write(dir.join("brick.png"), b"px").unwrap();
        let device = CountingDevice::default();
        let log = LogHook::default();
        let mut loader = SceneTextureLoader {
            cache: None,
            device: &device,
            streams: None,
            textures_dir: Some(&dir),
            log: &log,
        };
        load(&mut loader, "brick.png");
        load(&mut loader, "brick.png");
        assert_eq!(device.calls.get(), 2);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn cleans_and_falls_back_to_file_name() {
        let dir = temp_dir("paths");
        std::fs::write(dir.join("maps").join("wall.png"), b"px").unwrap();
        std::fs::write(dir.join("floor.png"), b"px").unwrap();
        let device = CountingDevice::default();
        let log = LogHook::default();
        let mut loader = SceneTextureLoader {
            cache: None,
            device: &device,
            streams: None,
            textures_dir: Some(&dir),
            log: &log,
        };
        assert!(load(&mut loader, ".\\maps\\wall.png").has_texture());
        assert!(load(&mut loader, "\\..\\floor.png").has_texture());
        assert!(load(&mut loader, "../other/floor.png").has_texture());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn parent_relative_paths_resolve_against_textures_dir() {
        let root = temp_dir("sibling");
        let models = root.join("models");
        std::fs::create_dir_all(&models).unwrap();
        std::fs::create_dir_all(root.join("textures")).unwrap();
        std::fs::write(root.join("textures").join("brick.png"), b"px").unwrap();
        std::fs::write(models.join("brick.png"), b"").unwrap();
        let device = CountingDevice::default();
        let log = LogHook::default();
        let mut loader = SceneTextureLoader {
            cache: None,
            device: &device,
            streams: None,
            textures_dir: Some(&models),
            log: &log,
        };
        // The empty same-named file in models/ would fail to decode.
        assert!(load(&mut loader, "../textures/brick.png").has_texture());
        assert!(load(&mut loader, "..\\textures\\brick.png").has_texture());
        assert_eq!(device.calls.get(), 2);
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn failures_leave_material_untextured() {
        let dir = temp_dir("fail");
        std::fs::write(dir.join("empty.png"), b"").unwrap();
        let device = CountingDevice::default();
        let mut cache = TextureCache::new();
        let log = LogHook::default();
        let mut loader = SceneTextureLoader {
            cache: Some(&mut cache),
            device: &device,
            streams: None,
            textures_dir: Some(&dir),
            log: &log,
        };
        assert!(!load(&mut loader, "missing.png").has_texture());
        assert!(!load(&mut loader, "empty.png").has_texture());
        assert!(cache.is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[cfg(feature = "image")]
    #[test]
    fn image_decoder_produces_rgba8() {
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 255]));
        let mut png = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();

        let tex = ImageDecoder::new().create_texture("red.png", png.get_ref()).unwrap();
        assert_eq!((tex.width, tex.height), (2, 3));
        assert!(tex.is_consistent());
        assert_eq!(&tex.data[..4], &[255, 0, 0, 255]);

        let err = ImageDecoder::new().create_texture("bad.png", b"nope").unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
    }
}
