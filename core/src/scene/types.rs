//! Scene graph data types.

use std::sync::Arc;

use crate::material::ConvertedMaterial;
use crate::math::{Aabb, Mat4};
use crate::mesh::ConvertedMesh;

use super::registry::NameRegistry;

/// What a [`SceneNode`] carries.
#[derive(Debug, Clone)]
pub enum NodeContent {
    /// Ordered children.
    Group(Vec<SceneNode>),
    /// A renderable mesh with its material. Leaves never have children.
    Mesh {
        mesh: Arc<ConvertedMesh>,
        material: Option<Arc<ConvertedMaterial>>,
    },
}

/// A node in the converted scene tree.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Node name, may be empty.
    pub name: String,
    /// Local transform. `None` means identity.
    pub transform: Option<Mat4>,
    /// Group children or mesh payload.
    pub content: NodeContent,
    /// Bounds in the parent's space, `None` when the subtree has no geometry.
    pub bounds: Option<Aabb>,
}

impl SceneNode {
    /// Creates an empty group node.
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: None,
            content: NodeContent::Group(Vec::new()),
            bounds: None,
        }
    }

    /// Creates a mesh leaf.
    pub fn mesh(
        name: impl Into<String>,
        mesh: Arc<ConvertedMesh>,
        material: Option<Arc<ConvertedMaterial>>,
    ) -> Self {
        Self {
            name: name.into(),
            transform: None,
            content: NodeContent::Mesh { mesh, material },
            bounds: None,
        }
    }

    /// Set the local transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Append a child. Has no effect on mesh leaves.
    #[must_use]
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.push_child(child);
        self
    }

    /// Append a child, returning its index. Mesh leaves reject children.
    pub fn push_child(&mut self, child: SceneNode) -> Option<usize> {
        match &mut self.content {
            NodeContent::Group(children) => {
                children.push(child);
                Some(children.len() - 1)
            }
            NodeContent::Mesh { .. } => None,
        }
    }

    /// Children of a group, empty for leaves.
    pub fn children(&self) -> &[SceneNode] {
        match &self.content {
            NodeContent::Group(children) => children,
            NodeContent::Mesh { .. } => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.content, NodeContent::Mesh { .. })
    }

    /// Mesh of a leaf node.
    pub fn mesh_ref(&self) -> Option<&Arc<ConvertedMesh>> {
        match &self.content {
            NodeContent::Mesh { mesh, .. } => Some(mesh),
            NodeContent::Group(_) => None,
        }
    }

    /// Material of a leaf node.
    pub fn material(&self) -> Option<&Arc<ConvertedMaterial>> {
        match &self.content {
            NodeContent::Mesh { material, .. } => material.as_ref(),
            NodeContent::Group(_) => None,
        }
    }

    /// Local transform, identity when unset.
    pub fn local_transform(&self) -> Mat4 {
        self.transform.unwrap_or_else(Mat4::identity)
    }

    /// Follow a child-index path from this node.
    pub fn descendant(&self, path: &[usize]) -> Option<&SceneNode> {
        path.iter()
            .try_fold(self, |node, &index| node.children().get(index))
    }

    /// Depth-first pre-order visit with depth.
    pub fn visit<F: FnMut(&SceneNode, usize)>(&self, f: &mut F) {
        self.visit_at(0, f);
    }

    fn visit_at<F: FnMut(&SceneNode, usize)>(&self, depth: usize, f: &mut F) {
        f(self, depth);
        for child in self.children() {
            child.visit_at(depth + 1, f);
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(SceneNode::node_count).sum::<usize>()
    }

    /// Recompute [`SceneNode::bounds`] for this subtree in one post-order pass.
    ///
    /// A group's box is the union of its children's boxes mapped through the
    /// group's own transform. Under rotation this is looser than transforming
    /// every leaf box through the full chain.
    pub fn update_bounds(&mut self) {
        let local = match &mut self.content {
            NodeContent::Mesh { mesh, .. } => Some(*mesh.bounds()),
            NodeContent::Group(children) => children
                .iter_mut()
                .filter_map(|child| {
                    child.update_bounds();
                    child.bounds
                })
                .reduce(|a, b| a.union(&b)),
        };
        self.bounds = match (&self.transform, local) {
            (Some(t), Some(b)) => Some(b.transformed(t)),
            (None, b) => b,
            (_, None) => None,
        };
    }
}

/// A converted scene: the root node and its name lookup.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub root: SceneNode,
    pub names: NameRegistry,
}

impl SceneGraph {
    pub fn new(root: SceneNode, names: NameRegistry) -> Self {
        Self { root, names }
    }

    /// Node registered under `name`.
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        let path = self.names.get(name)?;
        self.root.descendant(path)
    }

    /// Root bounds, `None` for a scene without geometry.
    pub fn bounds(&self) -> Option<&Aabb> {
        self.root.bounds.as_ref()
    }

    /// All leaves as (accumulated transform, node) pairs.
    pub fn leaves(&self) -> Vec<(Mat4, &SceneNode)> {
        let mut out = Vec::new();
        collect_leaves(&self.root, &Mat4::identity(), &mut out);
        out
    }

    /// Distinct meshes referenced by the scene.
    pub fn mesh_count(&self) -> usize {
        let mut seen: Vec<*const ConvertedMesh> = Vec::new();
        self.root.visit(&mut |node, _| {
            if let Some(mesh) = node.mesh_ref() {
                let ptr = Arc::as_ptr(mesh);
                if !seen.contains(&ptr) {
                    seen.push(ptr);
                }
            }
        });
        seen.len()
    }
}

fn collect_leaves<'a>(node: &'a SceneNode, parent: &Mat4, out: &mut Vec<(Mat4, &'a SceneNode)>) {
    let m = parent * node.local_transform();
    if node.is_leaf() {
        out.push((m, node));
    }
    for child in node.children() {
        collect_leaves(child, &m, out);
    }
}
