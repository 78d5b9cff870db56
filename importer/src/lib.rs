//! # Sceneport
//!
//! Imports 3D scene files into engine-ready scene graphs.
//!
//! A [`SceneReader`] parses a file into a [`RawScene`](sceneport_core::raw::RawScene);
//! the [`Importer`] runs it through material decoding, mesh assembly and
//! graph building from `sceneport-core`, loading textures on the way.
//!
//! ```ignore
//! use sceneport::{ImportSettings, Importer};
//!
//! let mut importer = Importer::with_defaults(ImportSettings::default())?;
//! if let Some(graph) = importer.read_scene("assets/house.obj", None)? {
//!     println!("{} nodes", graph.root.node_count());
//! }
//! ```

pub mod error;
mod importer;
pub mod reader;
pub mod readers;
pub mod settings;
pub mod texture;

pub use error::{ImportError, ReaderError, SettingsError, TextureError};
pub use importer::{Importer, ImporterBuilder, ImporterState, LogCallback, RawSceneHandle};
pub use reader::{FormatInfo, LibraryVersion, ProviderResolver, ResourceResolver, SceneReader};
pub use readers::BuiltinReader;
pub use settings::{ImportSettings, Triangulation};
#[cfg(feature = "image")]
pub use texture::ImageDecoder;
pub use texture::{TextureCache, TextureDevice};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
