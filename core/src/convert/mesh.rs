//! Raw mesh to flat vertex/index buffers.

use std::sync::Arc;

use crate::math::{Aabb, Vec2, Vec3};
use crate::mesh::{ConvertedMesh, Vertex, VertexAttributes};
use crate::raw::RawMesh;

use super::triangulate::{resolve_triangulator, triangulate_polygon, Triangulator};
use super::{ConvertSettings, TriangulationMode};

/// Converts raw meshes with one triangulation policy.
///
/// Resolves the polygon strategy once and keeps scratch buffers between
/// meshes of the same scene.
pub struct MeshAssembler<'a> {
    settings: &'a ConvertSettings,
    triangulator: Option<Arc<dyn Triangulator>>,
    points: Vec<Vec3>,
    scratch: Vec<Vec2>,
}

impl<'a> MeshAssembler<'a> {
    pub fn new(settings: &'a ConvertSettings) -> Self {
        let triangulator = match settings.triangulation {
            TriangulationMode::General => resolve_triangulator(settings.triangulator.as_ref()),
            TriangulationMode::SimpleFan => None,
        };
        Self {
            settings,
            triangulator,
            points: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Assemble one mesh, or `None` when it has no vertices or no triangles.
    pub fn assemble(&mut self, raw: &RawMesh) -> Option<ConvertedMesh> {
        let vertex_count = raw.vertex_count();
        if vertex_count == 0 || raw.face_count() == 0 {
            return None;
        }

        let (mut vertices, bounds, mut attributes) = build_vertices(raw);
        let indices = self.build_indices(raw);
        if indices.is_empty() {
            log::debug!("Mesh '{}' produced no triangles, skipping", raw.name);
            return None;
        }

        if !attributes.contains(VertexAttributes::NORMAL) && self.settings.calculate_normals {
            compute_normals(&mut vertices, &indices);
            attributes |= VertexAttributes::NORMAL;
        }

        Some(ConvertedMesh::new(vertices, indices, bounds, attributes).with_name(raw.name.clone()))
    }

    fn build_indices(&mut self, raw: &RawMesh) -> Vec<u32> {
        let vertex_count = raw.vertex_count();
        let max_triangles: usize = raw.faces.iter().map(|f| f.len().saturating_sub(2)).sum();
        let mut indices = Vec::with_capacity(max_triangles * 3);
        let simple = self.settings.triangulation == TriangulationMode::SimpleFan;

        for face in &raw.faces {
            if face.len() < 3 {
                continue;
            }
            if face.iter().any(|&i| i as usize >= vertex_count) {
                log::debug!(
                    "Dropping face with out-of-range index in mesh '{}' ({} vertices)",
                    raw.name,
                    vertex_count
                );
                continue;
            }

            match face.len() {
                3 => indices.extend_from_slice(face),
                4 => {
                    let start = if simple {
                        0
                    } else {
                        let p = |k: usize| Vec3::from(raw.positions[face[k] as usize]);
                        quad_fan_start(&[p(0), p(1), p(2), p(3)])
                    };
                    push_fan(&mut indices, face, start);
                }
                _ => match self.triangulate(raw, face) {
                    Some(local) => indices.extend(local.iter().map(|&i| face[i as usize])),
                    None => push_fan(&mut indices, face, 0),
                },
            }
        }

        debug_assert!(indices.len() <= max_triangles * 3);
        indices.shrink_to_fit();
        indices
    }

    fn triangulate(&mut self, raw: &RawMesh, face: &[u32]) -> Option<Vec<u32>> {
        let triangulator = self.triangulator.as_deref()?;
        self.points.clear();
        self.points
            .extend(face.iter().map(|&i| Vec3::from(raw.positions[i as usize])));
        triangulate_polygon(triangulator, &self.points, &mut self.scratch)
    }
}

/// Assemble a single mesh with `settings`.
pub fn assemble_mesh(raw: &RawMesh, settings: &ConvertSettings) -> Option<ConvertedMesh> {
    MeshAssembler::new(settings).assemble(raw)
}

fn build_vertices(raw: &RawMesh) -> (Vec<Vertex>, Aabb, VertexAttributes) {
    let count = raw.vertex_count();
    let normals = raw.normals.as_deref().filter(|n| n.len() == count);
    let uvs = raw.tex_coords.as_deref().filter(|t| t.len() == count);
    if raw.normals.is_some() && normals.is_none() {
        log::debug!("Ignoring normals of mesh '{}': length mismatch", raw.name);
    }
    if raw.tex_coords.is_some() && uvs.is_none() {
        log::debug!("Ignoring texture coordinates of mesh '{}': length mismatch", raw.name);
    }

    let mut attributes = VertexAttributes::POSITION;
    let mut vertices = Vec::with_capacity(count);
    let mut bounds = Aabb::from_point(Vec3::from(raw.positions[0]));

    match (normals, uvs) {
        (Some(normals), Some(uvs)) => {
            attributes |= VertexAttributes::NORMAL | VertexAttributes::TEX_COORD;
            for ((p, n), t) in raw.positions.iter().zip(normals).zip(uvs) {
                bounds.extend(&Vec3::from(*p));
                vertices.push(Vertex {
                    position: *p,
                    normal: *n,
                    uv: [t[0], t[1]],
                });
            }
        }
        (None, None) => {
            for p in &raw.positions {
                bounds.extend(&Vec3::from(*p));
                vertices.push(Vertex {
                    position: *p,
                    ..Vertex::default()
                });
            }
        }
        (normals, uvs) => {
            if normals.is_some() {
                attributes |= VertexAttributes::NORMAL;
            }
            if uvs.is_some() {
                attributes |= VertexAttributes::TEX_COORD;
            }
            for (i, p) in raw.positions.iter().enumerate() {
                bounds.extend(&Vec3::from(*p));
                vertices.push(Vertex {
                    position: *p,
                    normal: normals.map_or([0.0; 3], |n| n[i]),
                    uv: uvs.map_or([0.0; 2], |t| [t[i][0], t[i][1]]),
                });
            }
        }
    }

    (vertices, bounds, attributes)
}

/// Fan origin for a quad that avoids cutting across a reflex corner.
///
/// Each corner normal is the cross product of the incoming and outgoing
/// edge. The first corner (1, 2, 3) whose normal opposes the summed normal is
/// reflex and becomes the origin; otherwise the fan starts at 0.
pub fn quad_fan_start(p: &[Vec3; 4]) -> usize {
    let edges = [p[1] - p[0], p[2] - p[1], p[3] - p[2], p[0] - p[3]];
    let corners = [
        edges[3].cross(&edges[0]),
        edges[0].cross(&edges[1]),
        edges[1].cross(&edges[2]),
        edges[2].cross(&edges[3]),
    ];
    let sum: Vec3 = corners.iter().sum();
    (1..4).find(|&i| corners[i].dot(&sum) < 0.0).unwrap_or(0)
}

/// Push a triangle fan over `face` rooted at `start`.
fn push_fan(indices: &mut Vec<u32>, face: &[u32], start: usize) {
    let n = face.len();
    for k in 1..n - 1 {
        indices.push(face[start]);
        indices.push(face[(start + k) % n]);
        indices.push(face[(start + k + 1) % n]);
    }
}

/// Accumulate face normals at each referenced vertex, then normalize.
fn compute_normals(vertices: &mut [Vertex], indices: &[u32]) {
    let mut sums = vec![Vec3::zeros(); vertices.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (pa, pb, pc) = (vertices[a].position(), vertices[b].position(), vertices[c].position());
        let Some(n) = (pb - pa).cross(&(pc - pa)).try_normalize(f32::EPSILON) else {
            continue;
        };
        sums[a] += n;
        sums[b] += n;
        sums[c] += n;
    }
    for (v, n) in vertices.iter_mut().zip(sums) {
        if let Some(n) = n.try_normalize(f32::EPSILON) {
            v.normal = n.into();
        }
    }
}
