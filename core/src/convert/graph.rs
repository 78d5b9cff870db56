//! Raw node tree to [`SceneGraph`].

use std::sync::Arc;

use crate::material::ConvertedMaterial;
use crate::math::{is_identity_row_major, mat4_from_row_major};
use crate::mesh::ConvertedMesh;
use crate::raw::{RawNode, RawScene};
use crate::scene::{NameRegistry, NodeContent, NodePath, SceneGraph, SceneNode};

/// Name of the synthetic node wrapping the converted tree.
pub const ROOT_NODE_NAME: &str = "RootNode";

/// Suffix appended to a group split off a node that also carries meshes.
pub const GROUP_SUFFIX: &str = "-group";

/// Build the scene graph for `raw`.
///
/// `meshes` and `materials` are indexed like `raw.meshes` and
/// `raw.materials`. `None` marks a mesh the assembler skipped. The mesh
/// table is consumed so that once the build returns, leaves hold the only
/// references to their meshes.
pub fn build_scene_graph(
    raw: &RawScene,
    meshes: Vec<Option<Arc<ConvertedMesh>>>,
    materials: &[Arc<ConvertedMaterial>],
) -> SceneGraph {
    let mut builder = GraphBuilder {
        raw,
        meshes,
        materials,
        names: NameRegistry::new(),
    };

    let mut wrapper = SceneNode::group(ROOT_NODE_NAME);
    builder.build_node(&raw.root, &mut wrapper, &Vec::new());
    let mut names = builder.finish();

    let mut root = match wrapper.content {
        NodeContent::Group(mut children) if children.len() == 1 => {
            names.promote_first_child();
            children.remove(0)
        }
        content => SceneNode { content, ..wrapper },
    };
    root.update_bounds();

    SceneGraph::new(root, names)
}

struct GraphBuilder<'a> {
    raw: &'a RawScene,
    meshes: Vec<Option<Arc<ConvertedMesh>>>,
    materials: &'a [Arc<ConvertedMaterial>],
    names: NameRegistry,
}

impl GraphBuilder<'_> {
    /// Drop the mesh table and hand back the registry.
    fn finish(self) -> NameRegistry {
        self.names
    }

    fn build_node(&mut self, node: &RawNode, parent: &mut SceneNode, parent_path: &NodePath) {
        let transform = (!is_identity_row_major(&node.transform))
            .then(|| mat4_from_row_major(&node.transform));

        for &mesh_index in &node.meshes {
            let Some(mesh) = self.meshes.get(mesh_index).cloned().flatten() else {
                log::debug!("Node '{}' references missing mesh {mesh_index}", node.name);
                continue;
            };
            let material = self.material_for(mesh_index);
            let name = composite_name(&node.name, mesh.name());

            let mut leaf = SceneNode::mesh(name, mesh, material);
            leaf.transform = transform;
            let name = leaf.name.clone();
            if let Some(index) = parent.push_child(leaf) {
                self.names.register(&name, child_path(parent_path, index));
            }
        }

        if node.children.is_empty() {
            return;
        }

        let name = if !node.meshes.is_empty() && !node.name.is_empty() {
            format!("{}{GROUP_SUFFIX}", node.name)
        } else {
            node.name.clone()
        };
        let mut group = SceneNode::group(name);
        group.transform = transform;

        let path = child_path(parent_path, parent.children().len());
        for child in &node.children {
            self.build_node(child, &mut group, &path);
        }

        let name = group.name.clone();
        if parent.push_child(group).is_some() {
            self.names.register(&name, path);
        }
    }

    fn material_for(&self, mesh_index: usize) -> Option<Arc<ConvertedMaterial>> {
        let material_index = self.raw.meshes.get(mesh_index)?.material_index;
        let material = self.materials.get(material_index).cloned();
        if material.is_none() {
            log::debug!("Mesh {mesh_index} references missing material {material_index}");
        }
        material
    }
}

fn composite_name(node: &str, mesh: Option<&str>) -> String {
    match (node.is_empty(), mesh) {
        (false, Some(mesh)) => format!("{node}-{mesh}"),
        (false, None) => node.to_owned(),
        (true, Some(mesh)) => mesh.to_owned(),
        (true, None) => String::new(),
    }
}

fn child_path(parent: &NodePath, index: usize) -> NodePath {
    let mut path = Vec::with_capacity(parent.len() + 1);
    path.extend_from_slice(parent);
    path.push(index);
    path
}
