//! CPU-side texture data produced by texture devices.

/// Pixel layout of a [`CpuTexture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// 8-bit RGBA, sRGB encoded.
    #[default]
    Rgba8UnormSrgb,
    /// 8-bit RGBA, linear.
    Rgba8Unorm,
}

impl TextureFormat {
    /// Bytes per pixel.
    pub fn block_size(&self) -> u32 {
        4
    }
}

/// Decoded texture pixels ready for upload.
#[derive(Clone, PartialEq)]
pub struct CpuTexture {
    /// Source file name the texture was resolved from.
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// Tightly packed rows, `width * height * block_size` bytes.
    pub data: Vec<u8>,
}

impl CpuTexture {
    /// Creates an RGBA8 sRGB texture.
    pub fn new(name: impl Into<String>, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            format: TextureFormat::Rgba8UnormSrgb,
            data,
        }
    }

    /// Set the pixel format.
    #[must_use]
    pub fn with_format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }

    /// Whether the data length matches the dimensions.
    pub fn is_consistent(&self) -> bool {
        self.data.len() as u64
            == self.width as u64 * self.height as u64 * self.format.block_size() as u64
    }
}

impl std::fmt::Debug for CpuTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuTexture")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("data_len", &self.data.len())
            .finish()
    }
}
