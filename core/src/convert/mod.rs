//! Raw scene conversion pipeline.
//!
//! [`convert_scene`] runs the three stages over a borrowed [`RawScene`]:
//!
//! 1. [`decode_material`] for every entry of the material table
//! 2. [`MeshAssembler`] for every entry of the mesh table
//! 3. [`build_scene_graph`] over the node tree, attaching the results
//!
//! The raw scene is only read; the caller decides when to release it.

mod graph;
mod material;
mod mesh;
pub mod triangulate;

pub use graph::{build_scene_graph, GROUP_SUFFIX, ROOT_NODE_NAME};
pub use material::{decode_material, decode_properties};
pub use mesh::{assemble_mesh, quad_fan_start, MeshAssembler};
pub use triangulate::{
    clear_triangulator_override, set_triangulator_override, EarClipTriangulator,
    TriangulateError, Triangulator,
};

use std::sync::Arc;

use crate::material::{ConvertedMaterial, TextureLoader};
use crate::raw::RawScene;
use crate::scene::SceneGraph;

/// How faces with more than three vertices are split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriangulationMode {
    /// Fan from the first vertex for every polygon.
    SimpleFan,
    /// Concavity-aware fan for quads, polygon triangulator for larger faces.
    #[default]
    General,
}

/// Conversion options.
#[derive(Clone)]
pub struct ConvertSettings {
    pub triangulation: TriangulationMode,
    /// Synthesize per-vertex normals for meshes that have none.
    pub calculate_normals: bool,
    /// Strategy taking precedence over the process-wide override.
    pub triangulator: Option<Arc<dyn Triangulator>>,
}

impl ConvertSettings {
    pub fn new() -> Self {
        Self {
            triangulation: TriangulationMode::General,
            calculate_normals: true,
            triangulator: None,
        }
    }

    /// Set the triangulation mode.
    #[must_use]
    pub fn with_triangulation(mut self, triangulation: TriangulationMode) -> Self {
        self.triangulation = triangulation;
        self
    }

    /// Enable or disable normal synthesis.
    #[must_use]
    pub fn with_calculate_normals(mut self, calculate_normals: bool) -> Self {
        self.calculate_normals = calculate_normals;
        self
    }

    /// Inject a polygon triangulator for this conversion.
    #[must_use]
    pub fn with_triangulator(mut self, triangulator: Arc<dyn Triangulator>) -> Self {
        self.triangulator = Some(triangulator);
        self
    }
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConvertSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvertSettings")
            .field("triangulation", &self.triangulation)
            .field("calculate_normals", &self.calculate_normals)
            .field("triangulator", &self.triangulator.is_some())
            .finish()
    }
}

/// Convert a raw scene into a scene graph.
///
/// `textures` is called once per material that names a texture file.
pub fn convert_scene(
    raw: &RawScene,
    settings: &ConvertSettings,
    textures: &mut dyn TextureLoader,
) -> SceneGraph {
    let materials: Vec<Arc<ConvertedMaterial>> = raw
        .materials
        .iter()
        .map(|m| Arc::new(decode_material(m, textures)))
        .collect();

    let mut assembler = MeshAssembler::new(settings);
    let meshes: Vec<_> = raw
        .meshes
        .iter()
        .map(|m| assembler.assemble(m).map(Arc::new))
        .collect();
    let converted = meshes.iter().flatten().count();

    let graph = build_scene_graph(raw, meshes, &materials);
    log::info!(
        "Converted scene: {} nodes, {}/{} meshes, {} materials",
        graph.root.node_count(),
        converted,
        raw.meshes.len(),
        materials.len()
    );
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::NoTextures;
    use crate::raw::{keys, RawMaterial, RawMaterialProperty, RawMesh, RawNode};

    fn quad() -> RawMesh {
        RawMesh::new()
            .with_name("quad")
            .with_positions(vec![[0.0; 3], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]])
            .with_faces(vec![vec![0, 1, 2, 3]])
    }

    #[test]
    fn converts_full_scene() {
        let raw = RawScene::new()
            .with_root(RawNode::new().with_name("Root").with_children(vec![
                RawNode::new().with_name("A").with_meshes(vec![0]),
                RawNode::new().with_name("B").with_meshes(vec![0, 1]),
            ]))
            .with_meshes(vec![quad(), RawMesh::new().with_name("empty")])
            .with_materials(vec![RawMaterial::new()
                .with_property(RawMaterialProperty::string(keys::NAME, "Red"))
                .with_property(RawMaterialProperty::floats(keys::COLOR_DIFFUSE, &[1.0, 0.0, 0.0]))]);

        let graph = convert_scene(&raw, &ConvertSettings::default(), &mut NoTextures);
        assert_eq!(graph.root.name, "Root");
        assert_eq!(graph.root.children().len(), 2);
        assert_eq!(graph.mesh_count(), 1);
        let leaf = graph.find("B-quad").unwrap();
        assert_eq!(leaf.material().map(|m| m.diffuse), Some([1.0, 0.0, 0.0]));
        assert_eq!(leaf.mesh_ref().map(|m| m.triangle_count()), Some(2));
    }

    #[test]
    fn settings_builder() {
        let s = ConvertSettings::default()
            .with_triangulation(TriangulationMode::SimpleFan)
            .with_calculate_normals(false);
        assert_eq!(s.triangulation, TriangulationMode::SimpleFan);
        assert!(!s.calculate_normals);
        assert!(format!("{s:?}").contains("triangulator: false"));
    }
}
