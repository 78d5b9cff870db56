//! glTF 2.0 reader backed by the `gltf` crate.
//!
//! Every primitive becomes its own raw mesh; a node referencing a glTF mesh
//! references all of that mesh's primitives. Metallic-roughness materials are
//! mapped onto the classic property set: base color to diffuse, base color
//! alpha to opacity, the base color texture to the diffuse texture slot.

use sceneport_core::raw::{keys, RawMaterial, RawMaterialProperty, RawMesh, RawNode, RawScene};

use crate::error::ReaderError;
use crate::reader::{FormatInfo, LibraryVersion, SceneReader, SideFiles};

const DEFAULT_MATERIAL_NAME: &str = "DefaultMaterial";

/// Reads `.gltf` and `.glb` files.
pub struct GltfReader;

impl SceneReader for GltfReader {
    fn formats(&self) -> Vec<FormatInfo> {
        vec![FormatInfo::new("glTF 2.0", &["gltf", "glb"])]
    }

    fn version(&self) -> LibraryVersion {
        LibraryVersion::current()
    }

    fn read_memory(
        &self,
        data: &[u8],
        _format_hint: &str,
        side_files: &mut SideFiles<'_>,
    ) -> Result<RawScene, ReaderError> {
        let gltf = gltf_dep::Gltf::from_slice(data).map_err(|e| ReaderError::Parse(e.to_string()))?;
        let buffers = resolve_buffers(&gltf.document, gltf.blob.as_deref(), side_files)?;

        let mut materials: Vec<RawMaterial> = gltf.document.materials().map(load_material).collect();
        let default_material = materials.len();
        let (meshes, mesh_index_map) = load_meshes(&gltf.document, &buffers, default_material);
        if meshes.iter().any(|m| m.material_index == default_material) {
            materials.push(
                RawMaterial::new()
                    .with_property(RawMaterialProperty::string(keys::NAME, DEFAULT_MATERIAL_NAME)),
            );
        }

        let root = match gltf.document.default_scene().or_else(|| gltf.document.scenes().next()) {
            Some(scene) => RawNode::new()
                .with_name(scene.name().unwrap_or_default())
                .with_children(
                    scene
                        .nodes()
                        .map(|n| load_node(&n, &mesh_index_map))
                        .collect(),
                ),
            None => RawNode::new(),
        };

        log::debug!(
            "glTF: {} nodes, {} meshes, {} materials",
            root.subtree_len(),
            meshes.len(),
            materials.len()
        );
        Ok(RawScene::new()
            .with_root(root)
            .with_meshes(meshes)
            .with_materials(materials))
    }
}

/// Recursively convert a node. glTF matrices are column-major.
fn load_node(node: &gltf_dep::Node<'_>, mesh_index_map: &[Vec<usize>]) -> RawNode {
    let columns = node.transform().matrix();
    let mut transform = [0.0f32; 16];
    for (row, chunk) in transform.chunks_exact_mut(4).enumerate() {
        for (col, value) in chunk.iter_mut().enumerate() {
            *value = columns[col][row];
        }
    }

    let meshes = node
        .mesh()
        .and_then(|m| mesh_index_map.get(m.index()).cloned())
        .unwrap_or_default();

    RawNode::new()
        .with_name(node.name().unwrap_or_default())
        .with_transform(transform)
        .with_meshes(meshes)
        .with_children(
            node.children()
                .map(|c| load_node(&c, mesh_index_map))
                .collect(),
        )
}

/// Flatten primitives into raw meshes.
///
/// Returns the meshes and, per glTF mesh, the indices of its primitives.
fn load_meshes(
    document: &gltf_dep::Document,
    buffers: &[Vec<u8>],
    default_material: usize,
) -> (Vec<RawMesh>, Vec<Vec<usize>>) {
    let mut meshes = Vec::new();
    let mut index_map = Vec::with_capacity(document.meshes().len());

    for mesh in document.meshes() {
        let mut indices = Vec::new();
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
            let Some(positions) = reader.read_positions() else {
                log::warn!("Skipping primitive without positions in mesh {}", mesh.index());
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let count = positions.len() as u32;
            let flat: Vec<u32> = match reader.read_indices() {
                Some(i) => i.into_u32().collect(),
                None => (0..count).collect(),
            };

            let faces = match primitive.mode() {
                gltf_dep::mesh::Mode::Triangles => {
                    flat.chunks_exact(3).map(|c| c.to_vec()).collect()
                }
                gltf_dep::mesh::Mode::TriangleStrip => strip_faces(&flat),
                gltf_dep::mesh::Mode::TriangleFan => flat
                    .windows(2)
                    .skip(1)
                    .map(|w| vec![flat[0], w[0], w[1]])
                    .collect(),
                mode => {
                    log::warn!("Skipping {mode:?} primitive in mesh {}", mesh.index());
                    continue;
                }
            };

            let material = primitive
                .material()
                .index()
                .unwrap_or(default_material);
            let mut raw = RawMesh::new()
                .with_name(mesh.name().unwrap_or_default())
                .with_positions(positions)
                .with_faces(faces)
                .with_material(material);
            if let Some(normals) = reader.read_normals() {
                raw = raw.with_normals(normals.collect());
            }
            if let Some(uvs) = reader.read_tex_coords(0) {
                raw = raw.with_tex_coords(uvs.into_f32().map(|[u, v]| [u, v, 0.0]).collect());
            }

            indices.push(meshes.len());
            meshes.push(raw);
        }
        index_map.push(indices);
    }

    (meshes, index_map)
}

/// Strip to triangle list, alternating winding so all faces keep orientation.
fn strip_faces(indices: &[u32]) -> Vec<Vec<u32>> {
    indices
        .windows(3)
        .enumerate()
        .map(|(i, w)| {
            if i % 2 == 0 {
                vec![w[0], w[1], w[2]]
            } else {
                vec![w[1], w[0], w[2]]
            }
        })
        .collect()
}

fn load_material(material: gltf_dep::Material<'_>) -> RawMaterial {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();

    let mut raw = RawMaterial::new()
        .with_property(RawMaterialProperty::string(
            keys::NAME,
            material.name().unwrap_or_default(),
        ))
        .with_property(RawMaterialProperty::floats(keys::COLOR_DIFFUSE, &[r, g, b]))
        .with_property(RawMaterialProperty::floats(
            keys::COLOR_EMISSIVE,
            &material.emissive_factor(),
        ))
        .with_property(RawMaterialProperty::float(keys::OPACITY, a));

    if let Some(info) = pbr.base_color_texture() {
        let texture = info.texture();
        match texture.source().source() {
            gltf_dep::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => {
                let sampler = texture.sampler();
                raw = raw
                    .with_property(
                        RawMaterialProperty::string(keys::TEXTURE_FILE, uri)
                            .with_texture_slot(keys::SEMANTIC_DIFFUSE, 0),
                    )
                    .with_property(RawMaterialProperty::integer(
                        keys::TEXTURE_MAP_MODE_U,
                        map_wrapping(sampler.wrap_s()),
                    ))
                    .with_property(RawMaterialProperty::integer(
                        keys::TEXTURE_MAP_MODE_V,
                        map_wrapping(sampler.wrap_t()),
                    ));
            }
            _ => log::debug!(
                "Embedded texture on material {:?} is not addressable by name",
                material.name()
            ),
        }
    }
    raw
}

fn map_wrapping(wrap: gltf_dep::texture::WrappingMode) -> i32 {
    match wrap {
        gltf_dep::texture::WrappingMode::Repeat => 0,
        gltf_dep::texture::WrappingMode::ClampToEdge => 1,
        gltf_dep::texture::WrappingMode::MirroredRepeat => 2,
    }
}

/// Resolve all buffer data.
///
/// The binary chunk backs `Bin` buffers, data URIs are decoded inline and
/// any other URI is fetched through `side_files`.
fn resolve_buffers(
    document: &gltf_dep::Document,
    blob: Option<&[u8]>,
    side_files: &mut SideFiles<'_>,
) -> Result<Vec<Vec<u8>>, ReaderError> {
    let mut buffers = Vec::with_capacity(document.buffers().len());

    for buffer in document.buffers() {
        let data = match buffer.source() {
            gltf_dep::buffer::Source::Bin => blob
                .ok_or_else(|| ReaderError::Parse("binary buffer referenced but no blob present".into()))?
                .to_vec(),
            gltf_dep::buffer::Source::Uri(uri) if uri.starts_with("data:") => parse_data_uri(uri)
                .ok_or_else(|| ReaderError::Parse(format!("malformed data URI in buffer {}", buffer.index())))?,
            gltf_dep::buffer::Source::Uri(uri) => {
                side_files(uri).ok_or_else(|| ReaderError::MissingResource(uri.to_string()))?
            }
        };
        if data.len() < buffer.length() {
            return Err(ReaderError::Parse(format!(
                "buffer {} holds {} bytes, expected {}",
                buffer.index(),
                data.len(),
                buffer.length()
            )));
        }
        buffers.push(data);
    }

    Ok(buffers)
}

/// Decode a `data:<mime>;base64,<payload>` URI.
fn parse_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let start = rest.find(";base64,")?;
    base64_decode(&rest[start + 8..])
}

fn base64_decode(input: &str) -> Option<Vec<u8>> {
    const TABLE: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    let input: Vec<u8> = input.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    let mut out = Vec::with_capacity(input.len() * 3 / 4);

    for chunk in input.chunks(4) {
        let mut buf = [0u8; 4];
        let mut pad = 0;
        for (slot, &byte) in buf.iter_mut().zip(chunk) {
            if byte == b'=' {
                pad += 1;
            } else {
                *slot = TABLE.iter().position(|&b| b == byte)? as u8;
            }
        }
        pad += 4 - chunk.len();

        out.push((buf[0] << 2) | (buf[1] >> 4));
        if pad < 2 {
            out.push((buf[1] << 4) | (buf[2] >> 2));
        }
        if pad < 1 {
            out.push((buf[2] << 6) | buf[3]);
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "name": "Scene", "nodes": [0] }],
        "nodes": [
            { "name": "Parent", "translation": [1.0, 2.0, 3.0], "children": [1] },
            { "name": "Tri", "mesh": 0 }
        ],
        "meshes": [{ "name": "TriMesh", "primitives": [{ "attributes": { "POSITION": 0 }, "material": 0 }] }],
        "materials": [{
            "name": "Red",
            "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 0.5], "baseColorTexture": { "index": 0 } },
            "emissiveFactor": [0.1, 0.2, 0.3]
        }],
        "textures": [{ "source": 0, "sampler": 0 }],
        "images": [{ "uri": "brick.png" }],
        "samplers": [{ "wrapS": 33071, "wrapT": 33648 }],
        "buffers": [{ "uri": "tri.bin", "byteLength": 36 }],
        "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }],
        "accessors": [{
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
        }]
    }"#;

    fn triangle_bin() -> Vec<u8> {
        [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .collect()
    }

    fn read_triangle() -> RawScene {
        let mut side = |name: &str| (name == "tri.bin").then(triangle_bin);
        GltfReader
            .read_memory(TRIANGLE_GLTF.as_bytes(), "gltf", &mut side)
            .unwrap()
    }

    #[test]
    fn test_base64_decode() {
        assert_eq!(base64_decode("SGVsbG8gV29ybGQ=").unwrap(), b"Hello World");
        assert_eq!(base64_decode("YQ==").unwrap(), b"a");
        assert!(base64_decode("a$==").is_none());
    }

    #[test]
    fn test_parse_data_uri() {
        let data = parse_data_uri("data:application/octet-stream;base64,AQID").unwrap();
        assert_eq!(data, vec![1, 2, 3]);
        assert!(parse_data_uri("file://some/path").is_none());
    }

    #[test]
    fn strips_alternate_winding() {
        assert_eq!(
            strip_faces(&[0, 1, 2, 3]),
            vec![vec![0, 1, 2], vec![2, 1, 3]]
        );
    }

    #[test]
    fn reads_nodes_with_row_major_transforms() {
        let scene = read_triangle();
        assert_eq!(scene.root.name, "Scene");
        let parent = &scene.root.children[0];
        assert_eq!(parent.name, "Parent");
        assert_eq!(parent.transform[3], 1.0);
        assert_eq!(parent.transform[7], 2.0);
        assert_eq!(parent.transform[11], 3.0);
        assert_eq!(parent.children[0].meshes, vec![0]);
    }

    #[test]
    fn reads_primitive_geometry() {
        let scene = read_triangle();
        assert_eq!(scene.meshes.len(), 1);
        let mesh = &scene.meshes[0];
        assert_eq!(mesh.name, "TriMesh");
        assert_eq!(mesh.positions[1], [1.0, 0.0, 0.0]);
        assert_eq!(mesh.faces, vec![vec![0, 1, 2]]);
        assert_eq!(mesh.material_index, 0);
    }

    #[test]
    fn maps_pbr_material() {
        let scene = read_triangle();
        assert_eq!(scene.materials.len(), 1);
        let mat = &scene.materials[0];
        assert_eq!(mat.get(keys::COLOR_DIFFUSE).unwrap().read_color(), [1.0, 0.0, 0.0]);
        assert_eq!(mat.get(keys::OPACITY).and_then(|p| p.read_f32()), Some(0.5));
        assert_eq!(
            mat.get(keys::TEXTURE_FILE).and_then(|p| p.read_string()).as_deref(),
            Some("brick.png")
        );
        assert_eq!(mat.get(keys::TEXTURE_MAP_MODE_U).and_then(|p| p.read_i32()), Some(1));
        assert_eq!(mat.get(keys::TEXTURE_MAP_MODE_V).and_then(|p| p.read_i32()), Some(2));
    }

    #[test]
    fn missing_buffer_is_an_error() {
        let err = GltfReader
            .read_memory(TRIANGLE_GLTF.as_bytes(), "gltf", &mut |_: &str| None)
            .unwrap_err();
        assert!(matches!(err, ReaderError::MissingResource(ref uri) if uri == "tri.bin"));
    }
}
