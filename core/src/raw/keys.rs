//! Well-known material property keys.
//!
//! The key strings follow the conventions used by common model-import
//! libraries so that readers can pass properties through untouched.

pub const NAME: &str = "?mat.name";
pub const COLOR_DIFFUSE: &str = "$clr.diffuse";
pub const COLOR_AMBIENT: &str = "$clr.ambient";
pub const COLOR_EMISSIVE: &str = "$clr.emissive";
pub const COLOR_SPECULAR: &str = "$clr.specular";
pub const OPACITY: &str = "$mat.opacity";
pub const SHININESS: &str = "$mat.shininess";
pub const SHININESS_STRENGTH: &str = "$mat.shinpercent";
pub const TEXTURE_FILE: &str = "$tex.file";
pub const TEXTURE_MAP_MODE_U: &str = "$tex.mapmodeu";
pub const TEXTURE_MAP_MODE_V: &str = "$tex.mapmodev";
pub const TEXTURE_BLEND: &str = "$tex.blend";

/// Texture semantic for diffuse maps.
pub const SEMANTIC_DIFFUSE: u32 = 1;
