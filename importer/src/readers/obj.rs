//! Wavefront OBJ reader backed by `tobj`.

use std::cell::RefCell;
use std::io::Cursor;

use sceneport_core::raw::{keys, RawMaterial, RawMaterialProperty, RawMesh, RawNode, RawScene};

use crate::error::ReaderError;
use crate::reader::{FormatInfo, LibraryVersion, SceneReader, SideFiles};

const DEFAULT_MATERIAL_NAME: &str = "DefaultMaterial";

/// Reads `.obj` files and their `.mtl` libraries.
pub struct ObjReader;

impl SceneReader for ObjReader {
    fn formats(&self) -> Vec<FormatInfo> {
        vec![FormatInfo::new("Wavefront OBJ", &["obj"])]
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
        let options = tobj::LoadOptions {
            single_index: true,
            triangulate: false,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };

        // tobj wants an `Fn` loader.
        let side_files = RefCell::new(side_files);
        let (models, materials) =
            tobj::load_obj_buf(&mut Cursor::new(data), &options, |mtl_path| {
                let name = mtl_path.to_string_lossy();
                let mut load = side_files.borrow_mut();
                let bytes = (**load)(&name).ok_or(tobj::LoadError::OpenFileFailed)?;
                tobj::load_mtl_buf(&mut Cursor::new(bytes))
            })
            .map_err(|e| ReaderError::Parse(e.to_string()))?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("Material library not loaded: {e}");
            Vec::new()
        });

        Ok(build_scene(&models, &materials))
    }
}

fn build_scene(models: &[tobj::Model], materials: &[tobj::Material]) -> RawScene {
    let mut raw_materials: Vec<RawMaterial> = materials.iter().map(convert_material).collect();
    let default_material = raw_materials.len();
    let mut needs_default = false;

    let mut children = Vec::with_capacity(models.len());
    let mut meshes = Vec::with_capacity(models.len());
    for model in models {
        let material_index = match model.mesh.material_id {
            Some(id) if id < default_material => id,
            _ => {
                needs_default = true;
                default_material
            }
        };
        let index = meshes.len();
        meshes.push(convert_mesh(model, material_index));
        children.push(
            RawNode::new()
                .with_name(model.name.clone())
                .with_meshes(vec![index]),
        );
    }

    if needs_default {
        raw_materials.push(
            RawMaterial::new()
                .with_property(RawMaterialProperty::string(keys::NAME, DEFAULT_MATERIAL_NAME))
                .with_property(RawMaterialProperty::floats(keys::COLOR_DIFFUSE, &[0.6, 0.6, 0.6])),
        );
    }

    log::debug!(
        "OBJ: {} models, {} materials",
        meshes.len(),
        raw_materials.len()
    );
    RawScene::new()
        .with_root(RawNode::new().with_children(children))
        .with_meshes(meshes)
        .with_materials(raw_materials)
}

fn convert_mesh(model: &tobj::Model, material_index: usize) -> RawMesh {
    let mesh = &model.mesh;
    let positions: Vec<[f32; 3]> = mesh
        .positions
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();
    let count = positions.len();

    let mut faces = Vec::new();
    if mesh.face_arities.is_empty() {
        faces.extend(mesh.indices.chunks_exact(3).map(|c| c.to_vec()));
    } else {
        let mut start = 0usize;
        for &arity in &mesh.face_arities {
            let end = start + arity as usize;
            match mesh.indices.get(start..end) {
                Some(face) => faces.push(face.to_vec()),
                None => break,
            }
            start = end;
        }
    }

    let mut raw = RawMesh::new()
        .with_name(model.name.clone())
        .with_positions(positions)
        .with_faces(faces)
        .with_material(material_index);
    if count > 0 && mesh.normals.len() == count * 3 {
        raw = raw.with_normals(
            mesh.normals
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect(),
        );
    }
    if count > 0 && mesh.texcoords.len() == count * 2 {
        raw = raw.with_tex_coords(
            mesh.texcoords
                .chunks_exact(2)
                .map(|c| [c[0], c[1], 0.0])
                .collect(),
        );
    }
    raw
}

fn convert_material(material: &tobj::Material) -> RawMaterial {
    let mut raw = RawMaterial::new()
        .with_property(RawMaterialProperty::string(keys::NAME, &material.name));

    let colors = [
        (keys::COLOR_DIFFUSE, material.diffuse),
        (keys::COLOR_AMBIENT, material.ambient),
        (keys::COLOR_SPECULAR, material.specular),
        (keys::COLOR_EMISSIVE, material.emissive),
    ];
    for (key, color) in colors {
        if let Some(c) = color {
            raw = raw.with_property(RawMaterialProperty::floats(key, &c));
        }
    }

    if let Some(shininess) = material.shininess {
        raw = raw.with_property(RawMaterialProperty::float(keys::SHININESS, shininess));
    }
    if let Some(dissolve) = material.dissolve {
        raw = raw.with_property(RawMaterialProperty::float(keys::OPACITY, dissolve));
    }
    if let Some(texture) = &material.diffuse_texture {
        raw = raw.with_property(
            RawMaterialProperty::string(keys::TEXTURE_FILE, texture)
                .with_texture_slot(keys::SEMANTIC_DIFFUSE, 0),
        );
    }
    raw
}
