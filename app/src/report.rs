//! Scene graph printing.

use std::io::{self, Write};

use sceneport_core::scene::{SceneGraph, SceneNode};

/// Write the node tree and a summary line.
pub fn print_graph(out: &mut impl Write, graph: &SceneGraph, max_depth: Option<usize>) -> io::Result<()> {
    let mut result = Ok(());
    graph.root.visit(&mut |node: &SceneNode, depth: usize| {
        if result.is_err() || max_depth.is_some_and(|max| depth > max) {
            return;
        }
        result = writeln!(out, "{}{}", "  ".repeat(depth), describe(node));
    });
    result?;

    write!(
        out,
        "{} nodes, {} meshes, {} names",
        graph.root.node_count(),
        graph.mesh_count(),
        graph.names.len()
    )?;
    match graph.bounds() {
        Some(b) => {
            let (center, size) = (b.center(), b.size());
            writeln!(
                out,
                ", center [{:.3}, {:.3}, {:.3}], size [{:.3}, {:.3}, {:.3}]",
                center.x, center.y, center.z, size.x, size.y, size.z
            )
        }
        None => writeln!(out, ", empty"),
    }
}

fn describe(node: &SceneNode) -> String {
    let name = if node.name.is_empty() {
        "<unnamed>"
    } else {
        &node.name
    };
    let Some(mesh) = node.mesh_ref() else {
        return format!("{name}/");
    };

    let mut line = format!(
        "{name} ({} vertices, {} triangles)",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    if let Some(material) = node.material() {
        line.push_str(&format!(" material '{}'", material.name));
        if let Some(texture) = &material.texture_name {
            let state = if material.has_texture() { "loaded" } else { "missing" };
            line.push_str(&format!(" texture '{texture}' ({state})"));
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use sceneport_core::convert::{convert_scene, ConvertSettings};
    use sceneport_core::material::NoTextures;
    use sceneport_core::raw::{RawMesh, RawNode, RawScene};

    fn graph() -> SceneGraph {
        let tri = RawMesh::new()
            .with_name("tri")
            .with_positions(vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
            .with_faces(vec![vec![0, 1, 2]]);
        let root = RawNode::new().with_name("house").with_children(vec![
            RawNode::new().with_name("a").with_meshes(vec![0]),
            RawNode::new()
                .with_name("b")
                .with_children(vec![RawNode::new().with_name("c").with_meshes(vec![0])]),
        ]);
        let raw = RawScene::new().with_root(root).with_meshes(vec![tri]);
        convert_scene(&raw, &ConvertSettings::default(), &mut NoTextures)
    }

    #[test]
    fn prints_tree_and_summary() {
        let mut out = Vec::new();
        print_graph(&mut out, &graph(), None).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "house/");
        assert_eq!(lines[1], "  a-tri (3 vertices, 1 triangles)");
        assert_eq!(lines[2], "  b/");
        assert_eq!(lines[3], "    c-tri (3 vertices, 1 triangles)");
        assert_eq!(
            lines[4],
            "4 nodes, 1 meshes, 4 names, center [0.500, 0.500, 0.000], size [1.000, 1.000, 0.000]"
        );
    }

    #[test]
    fn depth_limits_output() {
        let mut out = Vec::new();
        print_graph(&mut out, &graph(), Some(1)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("c-tri"));
        assert!(text.contains("  b/"));
    }
}
