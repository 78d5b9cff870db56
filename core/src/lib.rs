//! # Sceneport Core
//!
//! Converts a format-agnostic raw scene (node tree, mesh table, material
//! property table) into renderer-ready meshes, materials and a scene graph.
//!
//! - [`raw`] - Input model produced by scene readers
//! - [`convert`] - Material decoding, mesh assembly, triangulation, graph building
//! - [`mesh`], [`material`], [`scene`], [`texture`] - Output types

pub mod convert;
pub mod material;
pub mod math;
pub mod mesh;
pub mod raw;
pub mod scene;
pub mod texture;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
