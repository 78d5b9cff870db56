use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

use crate::math::{Aabb, Vec3};

/// One interleaved vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// Byte stride of one vertex.
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();

    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }
}

bitflags! {
    /// Vertex channels present in a mesh.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VertexAttributes: u32 {
        const POSITION = 1 << 0;
        const NORMAL = 1 << 1;
        const TEX_COORD = 1 << 2;
    }
}

/// A triangulated mesh ready for upload.
///
/// Immutable after construction. Shared between scene nodes via `Arc`.
#[derive(Clone, PartialEq)]
pub struct ConvertedMesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    bounds: Aabb,
    attributes: VertexAttributes,
    name: Option<String>,
}

impl ConvertedMesh {
    /// Assemble a mesh from finished buffers.
    ///
    /// `indices.len()` must be a multiple of three and every index must be
    /// in range for `vertices`.
    pub fn new(
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        bounds: Aabb,
        attributes: VertexAttributes,
    ) -> Self {
        debug_assert_eq!(indices.len() % 3, 0);
        debug_assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        Self {
            vertices,
            indices,
            bounds,
            attributes,
            name: None,
        }
    }

    /// Set a name. Empty names are stored as `None`.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = (!name.is_empty()).then_some(name);
        self
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangle list indices, stride 3.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Local-space bounds of all vertex positions.
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Input layout flags.
    pub fn attributes(&self) -> VertexAttributes {
        self.attributes
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Vertex buffer as raw bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

impl std::fmt::Debug for ConvertedMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvertedMesh")
            .field("name", &self.name)
            .field("vertex_count", &self.vertices.len())
            .field("triangle_count", &self.triangle_count())
            .field("attributes", &self.attributes)
            .field("bounds", &self.bounds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> ConvertedMesh {
        let vertices = vec![
            Vertex { position: [0.0, 0.0, 0.0], ..Default::default() },
            Vertex { position: [1.0, 0.0, 0.0], ..Default::default() },
            Vertex { position: [0.0, 1.0, 0.0], ..Default::default() },
        ];
        let bounds = Aabb::from_points(vertices.iter().map(Vertex::position)).unwrap();
        ConvertedMesh::new(vertices, vec![0, 1, 2], bounds, VertexAttributes::POSITION)
    }

    #[test]
    fn vertex_stride() {
        assert_eq!(Vertex::STRIDE, 32);
    }

    #[test]
    fn byte_views() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_bytes().len(), 3 * Vertex::STRIDE);
        assert_eq!(mesh.index_bytes().len(), 12);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
    }

    #[test]
    fn empty_name_is_none() {
        assert_eq!(triangle().with_name("").name(), None);
        assert_eq!(triangle().with_name("tri").name(), Some("tri"));
    }

    #[test]
    fn attribute_flags() {
        let flags = VertexAttributes::POSITION | VertexAttributes::NORMAL;
        assert!(flags.contains(VertexAttributes::NORMAL));
        assert!(!flags.contains(VertexAttributes::TEX_COORD));
    }
}
