//! Raw material property table to [`ConvertedMaterial`].

use crate::material::{ConvertedMaterial, TextureLoader, WrapMode};
use crate::raw::{keys, RawMaterial};

/// Decode one raw material.
///
/// Unknown keys are ignored and malformed payloads leave the corresponding
/// field at its default. When a texture filename is found, `loader` is
/// invoked once after all properties are applied.
pub fn decode_material(raw: &RawMaterial, loader: &mut dyn TextureLoader) -> ConvertedMaterial {
    let mut material = decode_properties(raw);
    if let Some(filename) = material.texture_name.clone() {
        let (wrap, blend) = (material.wrap_mode, material.blend_factor);
        loader.load_texture(&mut material, &filename, wrap, blend);
    }
    material
}

/// Decode all properties without resolving textures.
pub fn decode_properties(raw: &RawMaterial) -> ConvertedMaterial {
    let mut material = ConvertedMaterial::new();

    for prop in &raw.properties {
        match prop.key.as_str() {
            keys::NAME => {
                if let Some(name) = prop.read_string() {
                    material.name = name;
                } else {
                    log::debug!("Ignoring malformed material name ({} bytes)", prop.len());
                }
            }
            keys::COLOR_DIFFUSE => material.diffuse = prop.read_color(),
            keys::COLOR_AMBIENT => material.ambient = prop.read_color(),
            keys::COLOR_EMISSIVE => material.emissive = prop.read_color(),
            keys::COLOR_SPECULAR => material.specular = prop.read_color(),
            keys::OPACITY => {
                if let Some(alpha) = prop.read_f32() {
                    material.alpha = alpha;
                }
            }
            keys::SHININESS => {
                if let Some(power) = prop.read_f32() {
                    material.specular_power = power;
                }
            }
            keys::SHININESS_STRENGTH => {
                if let Some(strength) = prop.read_f32() {
                    material.specular = [strength; 3];
                }
            }
            keys::TEXTURE_FILE => match prop.read_string() {
                Some(file) if !file.is_empty() => material.texture_name = Some(file),
                Some(_) => {}
                None => log::debug!("Ignoring malformed texture filename"),
            },
            keys::TEXTURE_MAP_MODE_U => {
                if let Some(mode) = prop.read_i32() {
                    material.wrap_mode.0 = WrapMode::from_raw(mode);
                }
            }
            keys::TEXTURE_MAP_MODE_V => {
                if let Some(mode) = prop.read_i32() {
                    material.wrap_mode.1 = WrapMode::from_raw(mode);
                }
            }
            keys::TEXTURE_BLEND => {
                if let Some(blend) = prop.read_f32() {
                    material.blend_factor = blend;
                }
            }
            _ => {}
        }
    }

    if material.specular_power == 0.0 {
        material.specular = [0.0; 3];
    }
    material.has_transparency = material.alpha < 1.0;
    material
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{PropertyType, RawMaterialProperty};

    #[derive(Default)]
    struct RecordingLoader {
        calls: Vec<(String, (WrapMode, WrapMode), f32)>,
    }

    impl TextureLoader for RecordingLoader {
        fn load_texture(
            &mut self,
            material: &mut ConvertedMaterial,
            filename: &str,
            wrap_mode: (WrapMode, WrapMode),
            blend_factor: f32,
        ) {
            self.calls.push((filename.to_owned(), wrap_mode, blend_factor));
            material.name.push_str("+tex");
        }
    }

    #[test]
    fn decodes_all_known_keys() {
        let raw = RawMaterial::new()
            .with_property(RawMaterialProperty::string(keys::NAME, "Brick"))
            .with_property(RawMaterialProperty::floats(keys::COLOR_DIFFUSE, &[0.5, 0.25, 0.125]))
            .with_property(RawMaterialProperty::floats(keys::COLOR_AMBIENT, &[0.1, 0.1, 0.1, 1.0]))
            .with_property(RawMaterialProperty::floats(keys::COLOR_EMISSIVE, &[1.0, 0.0, 0.0]))
            .with_property(RawMaterialProperty::floats(keys::COLOR_SPECULAR, &[0.9, 0.9, 0.9]))
            .with_property(RawMaterialProperty::float(keys::OPACITY, 0.75))
            .with_property(RawMaterialProperty::float(keys::SHININESS, 32.0))
            .with_property(RawMaterialProperty::integer(keys::TEXTURE_MAP_MODE_U, 1))
            .with_property(RawMaterialProperty::integer(keys::TEXTURE_MAP_MODE_V, 2))
            .with_property(RawMaterialProperty::float(keys::TEXTURE_BLEND, 0.5));

        let mat = decode_properties(&raw);
        assert_eq!(mat.name, "Brick");
        assert_eq!(mat.diffuse, [0.5, 0.25, 0.125]);
        assert_eq!(mat.ambient, [0.1, 0.1, 0.1]);
        assert_eq!(mat.emissive, [1.0, 0.0, 0.0]);
        assert_eq!(mat.specular, [0.9, 0.9, 0.9]);
        assert_eq!(mat.alpha, 0.75);
        assert!(mat.has_transparency);
        assert_eq!(mat.specular_power, 32.0);
        assert_eq!(mat.wrap_mode, (WrapMode::Clamp, WrapMode::Mirror));
        assert_eq!(mat.blend_factor, 0.5);
        assert_eq!(mat.texture_name, None);
    }

    #[test]
    fn missing_shininess_forces_black_specular() {
        let raw = RawMaterial::new()
            .with_property(RawMaterialProperty::floats(keys::COLOR_SPECULAR, &[1.0, 1.0, 1.0]));
        let mat = decode_properties(&raw);
        assert_eq!(mat.specular, [0.0; 3]);
        assert_eq!(mat.alpha, 1.0);
        assert!(!mat.has_transparency);
    }

    #[test]
    fn shininess_strength_overwrites_specular() {
        let raw = RawMaterial::new()
            .with_property(RawMaterialProperty::floats(keys::COLOR_SPECULAR, &[1.0, 0.0, 0.0]))
            .with_property(RawMaterialProperty::float(keys::SHININESS, 8.0))
            .with_property(RawMaterialProperty::float(keys::SHININESS_STRENGTH, 0.3));
        let mat = decode_properties(&raw);
        assert_eq!(mat.specular, [0.3, 0.3, 0.3]);
    }

    #[test]
    fn opaque_alpha_is_not_transparent() {
        let raw = RawMaterial::new().with_property(RawMaterialProperty::float(keys::OPACITY, 1.0));
        assert!(!decode_properties(&raw).has_transparency);
    }

    #[test]
    fn decoding_is_deterministic() {
        let raw = RawMaterial::new().with_property(RawMaterialProperty::floats(
            keys::COLOR_DIFFUSE,
            &[0.3, 0.6, 0.9, 1.0],
        ));
        assert_eq!(decode_properties(&raw), decode_properties(&raw));
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let raw = RawMaterial::new()
            .with_property(RawMaterialProperty::new(
                keys::NAME,
                PropertyType::String,
                vec![7, 0, 0, 0, b'x', 0],
            ))
            .with_property(RawMaterialProperty::floats(keys::COLOR_DIFFUSE, &[0.5, 0.5]))
            .with_property(RawMaterialProperty::integer(keys::OPACITY, 0))
            .with_property(RawMaterialProperty::float("$mat.unknown", 3.0));
        let mat = decode_properties(&raw);
        assert_eq!(mat.name, "");
        assert_eq!(mat.diffuse, [0.0; 3]);
        assert_eq!(mat.alpha, 1.0);
    }

    #[test]
    fn texture_loader_invoked_with_wrap_and_blend() {
        let raw = RawMaterial::new()
            .with_property(RawMaterialProperty::string(keys::NAME, "m"))
            .with_property(
                RawMaterialProperty::string(keys::TEXTURE_FILE, "brick.png")
                    .with_texture_slot(keys::SEMANTIC_DIFFUSE, 0),
            )
            .with_property(RawMaterialProperty::integer(keys::TEXTURE_MAP_MODE_U, 1))
            .with_property(RawMaterialProperty::float(keys::TEXTURE_BLEND, 0.25));
        let mut loader = RecordingLoader::default();
        let mat = decode_material(&raw, &mut loader);
        assert_eq!(
            loader.calls,
            vec![("brick.png".to_owned(), (WrapMode::Clamp, WrapMode::Wrap), 0.25)]
        );
        assert_eq!(mat.texture_name.as_deref(), Some("brick.png"));
        assert_eq!(mat.name, "m+tex");
    }

    #[test]
    fn no_texture_no_loader_call() {
        let mut loader = RecordingLoader::default();
        decode_material(&RawMaterial::new(), &mut loader);
        assert!(loader.calls.is_empty());
    }
}
