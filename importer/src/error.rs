use std::path::PathBuf;

use sceneport_vfs::VfsError;
use thiserror::Error;

/// Errors surfaced by the [`Importer`](crate::Importer).
#[derive(Error, Debug)]
pub enum ImportError {
    /// A required collaborator was not supplied when building the importer.
    #[error("Importer configuration error: {0}")]
    Configuration(String),
    /// No reader handles the given extension.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    /// The scene reader failed.
    #[error("Failed to read scene: {0}")]
    Reader(#[from] ReaderError),
    /// Failed to read the input stream.
    #[error("Failed to read input stream: {0}")]
    Io(#[from] std::io::Error),
    /// The raw scene handle refers to a scene that has been released.
    #[error("Raw scene handle is stale or the scene has been released")]
    StaleHandle,
    /// The importer has been disposed.
    #[error("Use of disposed importer")]
    Disposed,
}

/// Errors from a [`SceneReader`](crate::SceneReader).
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Missing resource: {0}")]
    MissingResource(String),
    #[error("Unsupported format: {0}")]
    Unsupported(String),
}

/// Errors while resolving or decoding a texture.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Texture not found: {0}")]
    NotFound(String),
    #[error("Failed to decode texture {name}: {reason}")]
    Decode { name: String, reason: String },
    #[error("Resource error: {0}")]
    Vfs(#[from] VfsError),
}

/// Errors while loading [`ImportSettings`](crate::ImportSettings).
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}
