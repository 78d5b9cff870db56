/// Type tag of a raw material property payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// One or more little-endian `f32` values.
    Float,
    /// One or more little-endian `i32` values.
    Integer,
    /// Length-prefixed, NUL-terminated UTF-8 string.
    String,
    /// Opaque bytes.
    Buffer,
}

/// One typed key/value entry of a raw material.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMaterialProperty {
    /// Property key, e.g. `$clr.diffuse`.
    pub key: String,
    /// Texture semantic for `$tex.*` keys, zero otherwise.
    pub semantic: u32,
    /// Texture slot index for `$tex.*` keys, zero otherwise.
    pub index: u32,
    /// Payload type tag.
    pub ty: PropertyType,
    /// Raw payload bytes.
    pub data: Vec<u8>,
}

impl RawMaterialProperty {
    /// Property with an arbitrary payload.
    pub fn new(key: impl Into<String>, ty: PropertyType, data: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            semantic: 0,
            index: 0,
            ty,
            data,
        }
    }

    /// Float property holding a single value.
    pub fn float(key: impl Into<String>, value: f32) -> Self {
        Self::floats(key, &[value])
    }

    /// Float property holding several values (colors use 3 or 4).
    pub fn floats(key: impl Into<String>, values: &[f32]) -> Self {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::new(key, PropertyType::Float, data)
    }

    /// Integer property holding a single value.
    pub fn integer(key: impl Into<String>, value: i32) -> Self {
        Self::new(key, PropertyType::Integer, value.to_le_bytes().to_vec())
    }

    /// String property encoded as `u32` length, UTF-8 bytes, then NUL.
    pub fn string(key: impl Into<String>, value: &str) -> Self {
        let bytes = value.as_bytes();
        let mut data = Vec::with_capacity(bytes.len() + 5);
        data.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        data.extend_from_slice(bytes);
        data.push(0);
        Self::new(key, PropertyType::String, data)
    }

    /// Set the texture semantic and slot.
    #[must_use]
    pub fn with_texture_slot(mut self, semantic: u32, index: u32) -> Self {
        self.semantic = semantic;
        self.index = index;
        self
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// First float of a float payload.
    pub fn read_f32(&self) -> Option<f32> {
        if self.ty != PropertyType::Float {
            return None;
        }
        let bytes: [u8; 4] = self.data.get(..4)?.try_into().ok()?;
        Some(f32::from_le_bytes(bytes))
    }

    /// First integer of an integer payload.
    pub fn read_i32(&self) -> Option<i32> {
        if self.ty != PropertyType::Integer {
            return None;
        }
        let bytes: [u8; 4] = self.data.get(..4)?.try_into().ok()?;
        Some(i32::from_le_bytes(bytes))
    }

    /// Decode a string payload.
    ///
    /// Fails unless the declared length equals the payload length minus the
    /// 4-byte prefix and the trailing NUL.
    pub fn read_string(&self) -> Option<String> {
        if self.ty != PropertyType::String || self.data.len() < 5 {
            return None;
        }
        let prefix: [u8; 4] = self.data[..4].try_into().ok()?;
        let declared = u32::from_le_bytes(prefix) as usize;
        if declared != self.data.len() - 5 {
            return None;
        }
        String::from_utf8(self.data[4..4 + declared].to_vec()).ok()
    }

    /// Decode an RGB color from a 3- or 4-float payload.
    ///
    /// Any other type or length yields black.
    pub fn read_color(&self) -> [f32; 3] {
        if self.ty != PropertyType::Float || (self.data.len() != 12 && self.data.len() != 16) {
            return [0.0; 3];
        }
        let mut rgb = [0.0f32; 3];
        for (c, chunk) in rgb.iter_mut().zip(self.data.chunks_exact(4)) {
            *c = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        rgb
    }
}

/// A raw material: an unordered property list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMaterial {
    pub properties: Vec<RawMaterialProperty>,
}

impl RawMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property.
    #[must_use]
    pub fn with_property(mut self, property: RawMaterialProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// First property stored under `key`.
    pub fn get(&self, key: &str) -> Option<&RawMaterialProperty> {
        self.properties.iter().find(|p| p.key == key)
    }
}
