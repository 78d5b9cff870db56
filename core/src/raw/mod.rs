//! Format-agnostic scene description produced by scene readers.
//!
//! The raw model mirrors what a model-import library hands back: a node
//! tree referencing flat mesh and material tables by index, with materials
//! stored as an unordered list of typed key/value byte blobs.
//!
//! Converters only ever see `&RawScene`; the importer owns it and drops it
//! once conversion finishes.

pub mod keys;
mod property;

pub use property::{PropertyType, RawMaterial, RawMaterialProperty};

use crate::math::IDENTITY_ROW_MAJOR;

/// A node in the raw scene tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    /// Node name. May be empty or shared by several nodes.
    pub name: String,
    /// Local transform, row-major.
    pub transform: [f32; 16],
    /// Child nodes.
    pub children: Vec<RawNode>,
    /// Indices into [`RawScene::meshes`].
    pub meshes: Vec<usize>,
}

impl RawNode {
    /// Creates an unnamed node with an identity transform.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            transform: IDENTITY_ROW_MAJOR,
            children: Vec::new(),
            meshes: Vec::new(),
        }
    }

    /// Set the node name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the row-major local transform.
    #[must_use]
    pub fn with_transform(mut self, transform: [f32; 16]) -> Self {
        self.transform = transform;
        self
    }

    /// Set the mesh references.
    #[must_use]
    pub fn with_meshes(mut self, meshes: Vec<usize>) -> Self {
        self.meshes = meshes;
        self
    }

    /// Set the child nodes.
    #[must_use]
    pub fn with_children(mut self, children: Vec<RawNode>) -> Self {
        self.children = children;
        self
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(RawNode::subtree_len).sum::<usize>()
    }
}

impl Default for RawNode {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw mesh record: parallel vertex arrays plus polygonal faces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMesh {
    /// Mesh name. Empty means unnamed.
    pub name: String,
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals; either absent or one per position.
    pub normals: Option<Vec<[f32; 3]>>,
    /// First texture coordinate channel (u, v, w); absent or one per position.
    pub tex_coords: Option<Vec<[f32; 3]>>,
    /// Faces as ordered vertex-index lists of arbitrary size.
    pub faces: Vec<Vec<u32>>,
    /// Index into [`RawScene::materials`].
    pub material_index: usize,
}

impl RawMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mesh name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set vertex positions.
    #[must_use]
    pub fn with_positions(mut self, positions: Vec<[f32; 3]>) -> Self {
        self.positions = positions;
        self
    }

    /// Set vertex normals.
    #[must_use]
    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Set the texture coordinate channel.
    #[must_use]
    pub fn with_tex_coords(mut self, tex_coords: Vec<[f32; 3]>) -> Self {
        self.tex_coords = Some(tex_coords);
        self
    }

    /// Set the faces.
    #[must_use]
    pub fn with_faces(mut self, faces: Vec<Vec<u32>>) -> Self {
        self.faces = faces;
        self
    }

    /// Set the material index.
    #[must_use]
    pub fn with_material(mut self, material_index: usize) -> Self {
        self.material_index = material_index;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    pub fn has_tex_coords(&self) -> bool {
        self.tex_coords.is_some()
    }
}

/// A complete raw scene: node tree plus mesh and material tables.
#[derive(Debug, Clone, PartialEq)]
pub struct RawScene {
    /// Root of the node tree.
    pub root: RawNode,
    /// Mesh table referenced by [`RawNode::meshes`].
    pub meshes: Vec<RawMesh>,
    /// Material table referenced by [`RawMesh::material_index`].
    pub materials: Vec<RawMaterial>,
}

impl RawScene {
    /// Creates a scene with an unnamed empty root.
    pub fn new() -> Self {
        Self {
            root: RawNode::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
        }
    }

    /// Set the root node.
    #[must_use]
    pub fn with_root(mut self, root: RawNode) -> Self {
        self.root = root;
        self
    }

    /// Set the mesh table.
    #[must_use]
    pub fn with_meshes(mut self, meshes: Vec<RawMesh>) -> Self {
        self.meshes = meshes;
        self
    }

    /// Set the material table.
    #[must_use]
    pub fn with_materials(mut self, materials: Vec<RawMaterial>) -> Self {
        self.materials = materials;
        self
    }
}

impl Default for RawScene {
    fn default() -> Self {
        Self::new()
    }
}
