//! Converted scene graph.
//!
//! - [`SceneNode`] - Owned tree node: a group of children or a mesh leaf
//! - [`SceneGraph`] - Root node plus the [`NameRegistry`] built during import
//! - [`NameRegistry`] - Name to node lookup, last registration wins

mod registry;
mod types;

pub use registry::{NameRegistry, NodePath};
pub use types::{NodeContent, SceneGraph, SceneNode};
