//! Import settings loaded from TOML.
//!
//! ```toml
//! triangulation = "simple-fan"
//! calculate_normals = false
//! textures_dir = "assets/textures"
//! cache_textures = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use sceneport_core::convert::{ConvertSettings, TriangulationMode};

use crate::error::SettingsError;

/// How polygons with more than three vertices are split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Triangulation {
    /// Concavity-aware quads and general polygon triangulation.
    #[default]
    General,
    /// Plain fans from the first vertex.
    SimpleFan,
}

impl From<Triangulation> for TriangulationMode {
    fn from(value: Triangulation) -> Self {
        match value {
            Triangulation::General => TriangulationMode::General,
            Triangulation::SimpleFan => TriangulationMode::SimpleFan,
        }
    }
}

/// Importer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportSettings {
    #[serde(default)]
    pub triangulation: Triangulation,
    /// Synthesize normals for meshes that lack them.
    #[serde(default = "default_true")]
    pub calculate_normals: bool,
    /// Fallback directory for texture lookup.
    #[serde(default)]
    pub textures_dir: Option<PathBuf>,
    /// Share textures by filename within one import.
    #[serde(default = "default_true")]
    pub cache_textures: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            triangulation: Triangulation::default(),
            calculate_normals: true,
            textures_dir: None,
            cache_textures: true,
        }
    }
}

impl ImportSettings {
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&content)?;
        log::debug!("Loaded import settings from {}", path.display());
        Ok(settings)
    }

    /// Conversion settings without an injected triangulator.
    pub fn convert_settings(&self) -> ConvertSettings {
        ConvertSettings::default()
            .with_triangulation(self.triangulation.into())
            .with_calculate_normals(self.calculate_normals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(ImportSettings::from_toml_str("").unwrap(), ImportSettings::default());
    }

    #[test]
    fn parses_all_fields() {
        let settings = ImportSettings::from_toml_str(
            r#"
            triangulation = "simple-fan"
            calculate_normals = false
            textures_dir = "assets/textures"
            cache_textures = false
            "#,
        )
        .unwrap();
        assert_eq!(settings.triangulation, Triangulation::SimpleFan);
        assert!(!settings.calculate_normals);
        assert_eq!(settings.textures_dir, Some(PathBuf::from("assets/textures")));
        assert!(!settings.cache_textures);

        let convert = settings.convert_settings();
        assert_eq!(convert.triangulation, TriangulationMode::SimpleFan);
        assert!(!convert.calculate_normals);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ImportSettings::from_toml_str("triangulate = true").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ImportSettings::load(Path::new("/nonexistent/sceneport.toml")).unwrap_err();
        assert!(err.to_string().contains("sceneport.toml"));
    }
}
