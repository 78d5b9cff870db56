//! Process-wide triangulator override.
//!
//! Lives in its own test binary because the override is global state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sceneport_core::convert::{
    assemble_mesh, clear_triangulator_override, set_triangulator_override, ConvertSettings,
    TriangulationMode, Triangulator,
};
use sceneport_core::math::Vec2;
use sceneport_core::raw::RawMesh;

static CALLS: AtomicUsize = AtomicUsize::new(0);

struct LastVertexFan;

impl Triangulator for LastVertexFan {
    fn triangulate(&self, polygon: &[Vec2]) -> Option<Vec<u32>> {
        CALLS.fetch_add(1, Ordering::SeqCst);
        let n = polygon.len() as u32;
        Some((0..n - 2).flat_map(|i| [n - 1, i, i + 1]).collect())
    }
}

fn pentagon() -> RawMesh {
    RawMesh::new()
        .with_positions(vec![
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.5, 1.5, 0.0],
            [1.0, 2.5, 0.0],
            [-0.5, 1.5, 0.0],
        ])
        .with_faces(vec![vec![0, 1, 2, 3, 4]])
}

#[test]
fn override_is_used_then_cleared() {
    set_triangulator_override(Arc::new(LastVertexFan));

    let mesh = assemble_mesh(&pentagon(), &ConvertSettings::default()).unwrap();
    assert_eq!(mesh.indices(), &[4, 0, 1, 4, 1, 2, 4, 2, 3]);
    assert_eq!(CALLS.load(Ordering::SeqCst), 1);

    // Simple fan never consults a strategy.
    let settings = ConvertSettings::default().with_triangulation(TriangulationMode::SimpleFan);
    let mesh = assemble_mesh(&pentagon(), &settings).unwrap();
    assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3, 0, 3, 4]);
    assert_eq!(CALLS.load(Ordering::SeqCst), 1);

    // An injected strategy takes precedence over the override.
    let injected: Arc<dyn Triangulator> = Arc::new(|_: &[Vec2]| -> Option<Vec<u32>> { None });
    let mesh = assemble_mesh(
        &pentagon(),
        &ConvertSettings::default().with_triangulator(injected),
    )
    .unwrap();
    assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3, 0, 3, 4]);
    assert_eq!(CALLS.load(Ordering::SeqCst), 1);

    clear_triangulator_override();
    let mesh = assemble_mesh(&pentagon(), &ConvertSettings::default()).unwrap();
    assert_eq!(mesh.triangle_count(), 3);
    assert_eq!(CALLS.load(Ordering::SeqCst), 1);
}
