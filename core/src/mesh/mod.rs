//! Converted mesh types.
//!
//! - [`Vertex`] - Interleaved position/normal/uv record (`Pod`, upload-ready)
//! - [`VertexAttributes`] - Input-layout flags describing which channels the
//!   source actually provided
//! - [`ConvertedMesh`] - Flat vertex and triangle-index buffers with bounds

mod data;

pub use data::{ConvertedMesh, Vertex, VertexAttributes};
