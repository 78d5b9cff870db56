//! Converted material records.
//!
//! - [`ConvertedMaterial`] - Fixed-function style material decoded from raw
//!   property blobs, shared via `Arc` by every node that references it
//! - [`WrapMode`] - Texture addressing mode per axis
//! - [`TextureLoader`] - Hook that resolves a texture filename and fills in
//!   the material's texture fields

use std::sync::Arc;

use crate::texture::CpuTexture;

/// Texture addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    /// Tile the texture.
    #[default]
    Wrap,
    /// Clamp coordinates to the edge texel.
    Clamp,
    /// Tile with every other repetition mirrored.
    Mirror,
    /// Outside coordinates sample a border color.
    Decal,
}

impl WrapMode {
    /// Map an integer map-mode value as stored in material blobs.
    ///
    /// Unknown values fall back to [`WrapMode::Wrap`].
    pub fn from_raw(value: i32) -> Self {
        match value {
            0 => Self::Wrap,
            1 => Self::Clamp,
            2 => Self::Mirror,
            3 => Self::Decal,
            _ => Self::Wrap,
        }
    }

    /// Inverse of [`WrapMode::from_raw`].
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Wrap => 0,
            Self::Clamp => 1,
            Self::Mirror => 2,
            Self::Decal => 3,
        }
    }
}

/// A decoded material.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedMaterial {
    /// Material name, empty if the source had none.
    pub name: String,
    pub diffuse: [f32; 3],
    pub ambient: [f32; 3],
    pub emissive: [f32; 3],
    pub specular: [f32; 3],
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Specular exponent. Zero means the source set no shininess.
    pub specular_power: f32,
    /// Filename of the diffuse texture, as written in the source file.
    pub texture_name: Option<String>,
    /// Texture data filled in by a [`TextureLoader`].
    pub texture: Option<Arc<CpuTexture>>,
    /// Wrap mode along U and V.
    pub wrap_mode: (WrapMode, WrapMode),
    /// Texture blend factor.
    pub blend_factor: f32,
    /// Set when `alpha < 1`.
    pub has_transparency: bool,
}

impl ConvertedMaterial {
    /// Default material: white diffuse, black elsewhere, opaque.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            diffuse: [1.0; 3],
            ambient: [0.0; 3],
            emissive: [0.0; 3],
            specular: [0.0; 3],
            alpha: 1.0,
            specular_power: 0.0,
            texture_name: None,
            texture: None,
            wrap_mode: (WrapMode::Wrap, WrapMode::Wrap),
            blend_factor: 1.0,
            has_transparency: false,
        }
    }

    /// Set the material name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether the loader attached texture data.
    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }
}

impl Default for ConvertedMaterial {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a texture filename found in a material.
///
/// Called at most once per material, after all properties are decoded.
/// Implementations populate [`ConvertedMaterial::texture`] on success and
/// leave it untouched on failure.
pub trait TextureLoader {
    fn load_texture(
        &mut self,
        material: &mut ConvertedMaterial,
        filename: &str,
        wrap_mode: (WrapMode, WrapMode),
        blend_factor: f32,
    );
}

/// Loader that only records the filename and never loads data.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTextures;

impl TextureLoader for NoTextures {
    fn load_texture(
        &mut self,
        _material: &mut ConvertedMaterial,
        filename: &str,
        _wrap_mode: (WrapMode, WrapMode),
        _blend_factor: f32,
    ) {
        log::debug!("Texture '{filename}' not loaded (no texture loader)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_mode_mapping() {
        for mode in [WrapMode::Wrap, WrapMode::Clamp, WrapMode::Mirror, WrapMode::Decal] {
            assert_eq!(WrapMode::from_raw(mode.to_raw()), mode);
        }
        assert_eq!(WrapMode::from_raw(42), WrapMode::Wrap);
        assert_eq!(WrapMode::from_raw(-1), WrapMode::Wrap);
    }

    #[test]
    fn material_defaults() {
        let mat = ConvertedMaterial::default();
        assert_eq!(mat.alpha, 1.0);
        assert_eq!(mat.specular, [0.0; 3]);
        assert!(!mat.has_transparency);
        assert!(!mat.has_texture());
    }
}
