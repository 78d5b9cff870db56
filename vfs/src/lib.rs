//! Resource providers for scene side files (textures, material libraries,
//! external buffers).
//!
//! # Providers
//!
//! - [`MemoryProvider`] - In-memory storage for tests and embedded assets
//! - [`FileSystemProvider`] - Files below a root directory (native only)
//!
//! All paths handed to providers go through [`path::normalize`] first, so a
//! provider only ever sees forward-slash, relative paths without `.` or `..`
//! segments. Paths written by exporters are often sloppier than that;
//! [`path::clean_resource_path`] repairs the common cases before
//! normalization. On disk, [`FileSystemProvider::locate`] additionally
//! follows `..` for files that sit in a sibling of the scene's directory.

mod error;
#[cfg(all(feature = "filesystem", not(target_arch = "wasm32")))]
mod filesystem;
mod memory;
pub mod path;
mod provider;

pub use error::VfsError;
#[cfg(all(feature = "filesystem", not(target_arch = "wasm32")))]
pub use filesystem::FileSystemProvider;
pub use memory::MemoryProvider;
pub use provider::ResourceProvider;
