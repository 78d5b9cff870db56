//! Polygon triangulation strategies.
//!
//! A [`Triangulator`] maps a planar polygon, given as 2D points, to a
//! triangle index list. Strategies are resolved in this order:
//!
//! 1. a strategy injected through [`ConvertSettings`](super::ConvertSettings)
//! 2. the process-wide override ([`set_triangulator_override`])
//! 3. the bundled [`EarClipTriangulator`] (feature `ear-clipping`)
//!
//! When nothing resolves, or a strategy returns an invalid list, the mesh
//! assembler falls back to a triangle fan.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::math::{Vec2, Vec3};

/// Errors from triangulation helpers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriangulateError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Converts a simple polygon into triangles.
///
/// The result holds indices into `polygon`, three per triangle. Returning
/// `None` means the strategy could not handle the input.
pub trait Triangulator: Send + Sync {
    fn triangulate(&self, polygon: &[Vec2]) -> Option<Vec<u32>>;
}

impl<F> Triangulator for F
where
    F: Fn(&[Vec2]) -> Option<Vec<u32>> + Send + Sync,
{
    fn triangulate(&self, polygon: &[Vec2]) -> Option<Vec<u32>> {
        self(polygon)
    }
}

static OVERRIDE: RwLock<Option<Arc<dyn Triangulator>>> = parking_lot::const_rwlock(None);

/// Install a process-wide triangulator used by every subsequent conversion.
pub fn set_triangulator_override(triangulator: Arc<dyn Triangulator>) {
    *OVERRIDE.write() = Some(triangulator);
}

/// Remove the process-wide triangulator override.
pub fn clear_triangulator_override() {
    *OVERRIDE.write() = None;
}

/// Currently installed process-wide override.
pub fn triangulator_override() -> Option<Arc<dyn Triangulator>> {
    OVERRIDE.read().clone()
}

/// Resolve the strategy to use, preferring `injected`.
pub fn resolve_triangulator(
    injected: Option<&Arc<dyn Triangulator>>,
) -> Option<Arc<dyn Triangulator>> {
    injected
        .cloned()
        .or_else(triangulator_override)
        .or_else(builtin_triangulator)
}

#[cfg(feature = "ear-clipping")]
fn builtin_triangulator() -> Option<Arc<dyn Triangulator>> {
    static BUILTIN: std::sync::OnceLock<Arc<dyn Triangulator>> = std::sync::OnceLock::new();
    Some(BUILTIN.get_or_init(|| Arc::new(EarClipTriangulator)).clone())
}

#[cfg(not(feature = "ear-clipping"))]
fn builtin_triangulator() -> Option<Arc<dyn Triangulator>> {
    None
}

/// Project 3D polygon points onto the plane of their first three points.
///
/// The axis with the largest normal component is dropped. The remaining two
/// are ordered so that counter-clockwise winding around the normal stays
/// counter-clockwise in 2D.
pub fn project_to_plane(points: &[Vec3], out: &mut [Vec2]) -> Result<(), TriangulateError> {
    if points.len() < 3 {
        return Err(TriangulateError::InvalidArgument(format!(
            "polygon needs at least 3 points, got {}",
            points.len()
        )));
    }
    if out.len() < points.len() {
        return Err(TriangulateError::InvalidArgument(format!(
            "output buffer holds {} points, need {}",
            out.len(),
            points.len()
        )));
    }

    let normal = (points[1] - points[0]).cross(&(points[2] - points[0]));
    let abs = normal.abs();
    let (u, v) = if abs.x >= abs.y && abs.x >= abs.z {
        if normal.x >= 0.0 { (1, 2) } else { (2, 1) }
    } else if abs.y >= abs.z {
        if normal.y >= 0.0 { (2, 0) } else { (0, 2) }
    } else if normal.z >= 0.0 {
        (0, 1)
    } else {
        (1, 0)
    };

    for (dst, p) in out.iter_mut().zip(points) {
        *dst = Vec2::new(p[u], p[v]);
    }
    Ok(())
}

/// Whether `indices` is an acceptable triangulation of a `count`-gon.
pub fn is_valid_triangulation(indices: &[u32], count: usize) -> bool {
    indices.len() % 3 == 0
        && indices.len() / 3 <= count.saturating_sub(2)
        && indices.iter().all(|&i| (i as usize) < count)
}

/// Project and triangulate one polygon, validating the result.
///
/// `scratch` is reused between calls to avoid reallocating.
pub fn triangulate_polygon(
    triangulator: &dyn Triangulator,
    points: &[Vec3],
    scratch: &mut Vec<Vec2>,
) -> Option<Vec<u32>> {
    scratch.clear();
    scratch.resize(points.len(), Vec2::zeros());
    if let Err(e) = project_to_plane(points, scratch) {
        log::debug!("Skipping polygon triangulation: {e}");
        return None;
    }
    let indices = triangulator.triangulate(scratch)?;
    if is_valid_triangulation(&indices, points.len()) {
        Some(indices)
    } else {
        log::debug!(
            "Rejected triangulation of {}-gon ({} indices)",
            points.len(),
            indices.len()
        );
        None
    }
}

/// Ear-clipping triangulator for simple polygons of either winding.
#[derive(Debug, Default, Clone, Copy)]
pub struct EarClipTriangulator;

impl Triangulator for EarClipTriangulator {
    fn triangulate(&self, polygon: &[Vec2]) -> Option<Vec<u32>> {
        ear_clip(polygon)
    }
}

fn cross2(a: &Vec2, b: &Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| cross2(&points[i], &points[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

fn point_in_triangle(p: &Vec2, a: &Vec2, b: &Vec2, c: &Vec2, orientation: f32) -> bool {
    let d0 = cross2(&(b - a), &(p - a)) * orientation;
    let d1 = cross2(&(c - b), &(p - b)) * orientation;
    let d2 = cross2(&(a - c), &(p - c)) * orientation;
    d0 >= 0.0 && d1 >= 0.0 && d2 >= 0.0
}

fn ear_clip(points: &[Vec2]) -> Option<Vec<u32>> {
    let n = points.len();
    if n < 3 {
        return None;
    }
    let area = signed_area(points);
    if area == 0.0 || !area.is_finite() {
        return None;
    }
    let orientation = area.signum();

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut out = Vec::with_capacity((n - 2) * 3);

    while remaining.len() > 3 {
        let m = remaining.len();
        // Degenerate leftovers (collinear runs, duplicates) have no strict ear.
        let ear = (0..m)
            .find(|&i| is_ear(points, &remaining, i, orientation))
            .unwrap_or(0);
        let prev = remaining[(ear + m - 1) % m];
        let next = remaining[(ear + 1) % m];
        out.extend([prev as u32, remaining[ear] as u32, next as u32]);
        remaining.remove(ear);
    }
    out.extend(remaining.iter().map(|&i| i as u32));
    Some(out)
}

fn is_ear(points: &[Vec2], remaining: &[usize], i: usize, orientation: f32) -> bool {
    let m = remaining.len();
    let (ia, ib, ic) = (remaining[(i + m - 1) % m], remaining[i], remaining[(i + 1) % m]);
    let (a, b, c) = (&points[ia], &points[ib], &points[ic]);
    if cross2(&(b - a), &(c - b)) * orientation <= 0.0 {
        return false;
    }
    remaining
        .iter()
        .filter(|&&k| k != ia && k != ib && k != ic)
        .all(|&k| !point_in_triangle(&points[k], a, b, c, orientation))
}
