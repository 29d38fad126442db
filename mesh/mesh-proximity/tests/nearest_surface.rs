//! End-to-end nearest-surface queries: build a mesh, index it, probe it.

#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use mesh_bvh::IndexBuilder;
use mesh_proximity::{
    NearestSurfaceQuery, ProximityError, SurfaceAccel, SurfaceClass, TraversalMode,
};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The unit right triangle in the z = 0 plane.
fn unit_triangle() -> SurfaceAccel {
    let positions = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let faces = vec![[0u32, 1, 2]];
    let mut builder = IndexBuilder::new(4, 16);
    SurfaceAccel::build(&positions, &faces, &mut builder).unwrap()
}

/// A random soup of small triangles inside the unit cube.
fn random_soup(count: usize, seed: u64) -> SurfaceAccel {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions = Vec::with_capacity(count * 3);
    let mut faces = Vec::with_capacity(count);
    for _ in 0..count {
        let base = positions.len() as u32;
        let cx: f64 = rng.gen_range(0.0..1.0);
        let cy: f64 = rng.gen_range(0.0..1.0);
        let cz: f64 = rng.gen_range(0.0..1.0);
        for _ in 0..3 {
            positions.push(Point3::new(
                cx + rng.gen_range(-0.01..0.01),
                cy + rng.gen_range(-0.01..0.01),
                cz + rng.gen_range(-0.01..0.01),
            ));
        }
        faces.push([base, base + 1, base + 2]);
    }
    let mut builder = IndexBuilder::new(4, count);
    SurfaceAccel::build(&positions, &faces, &mut builder).unwrap()
}

#[test]
fn point_above_face_interior_projects_straight_down() {
    let accel = unit_triangle();
    let mut query = NearestSurfaceQuery::new(&accel, TraversalMode::Adaptive);

    let hit = query
        .find(&accel, &Point3::new(0.25, 0.25, 5.0), 10.0)
        .unwrap()
        .unwrap();

    assert_eq!(hit.class, SurfaceClass::Face);
    assert_eq!(hit.triangle, 0);
    assert_relative_eq!(hit.point.x, 0.25, epsilon = 1e-12);
    assert_relative_eq!(hit.point.y, 0.25, epsilon = 1e-12);
    assert_relative_eq!(hit.point.z, 0.0, epsilon = 1e-12);
    assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-12);
}

#[test]
fn point_beside_an_edge_clamps_onto_it() {
    let accel = unit_triangle();
    let mut query = NearestSurfaceQuery::new(&accel, TraversalMode::Adaptive);

    let hit = query
        .find(&accel, &Point3::new(-1.0, 0.5, 0.0), 10.0)
        .unwrap()
        .unwrap();

    assert_eq!(hit.class, SurfaceClass::Edge);
    assert_relative_eq!(hit.point.x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(hit.point.y, 0.5, epsilon = 1e-12);
    assert_relative_eq!(hit.distance, 1.0, epsilon = 1e-12);
}

#[test]
fn point_past_the_hypotenuse_projects_onto_it() {
    let accel = unit_triangle();
    let mut query = NearestSurfaceQuery::new(&accel, TraversalMode::Adaptive);

    let hit = query
        .find(&accel, &Point3::new(2.0, 2.0, 0.0), 10.0)
        .unwrap()
        .unwrap();

    assert_eq!(hit.class, SurfaceClass::Edge);
    assert_relative_eq!(hit.point.x, 0.5, epsilon = 1e-12);
    assert_relative_eq!(hit.point.y, 0.5, epsilon = 1e-12);
    assert_relative_eq!(hit.point.z, 0.0, epsilon = 1e-12);
}

#[test]
fn point_past_a_corner_snaps_to_the_vertex() {
    let accel = unit_triangle();
    let mut query = NearestSurfaceQuery::new(&accel, TraversalMode::Adaptive);

    let hit = query
        .find(&accel, &Point3::new(3.0, -1.0, 0.0), 10.0)
        .unwrap()
        .unwrap();

    assert_eq!(hit.class, SurfaceClass::Vertex);
    assert_relative_eq!(hit.point.x, 1.0, epsilon = 1e-12);
    assert_relative_eq!(hit.point.y, 0.0, epsilon = 1e-12);
}

#[test]
fn large_soup_builds_a_sane_tree_and_answers_consistently() {
    let accel = random_soup(10_000, 0xC0FFEE);
    let index = accel.index();

    assert_eq!(accel.triangle_count(), 10_000);

    // Every leaf honors the size cap; every primitive lands in exactly
    // one leaf.
    let mut seen = vec![false; accel.triangle_count()];
    for node in index.nodes() {
        if node.is_leaf() {
            assert!(node.count <= 4);
            for &id in index.leaf_primitives(node) {
                assert!(!seen[id as usize]);
                seen[id as usize] = true;
            }
        }
    }
    assert!(seen.iter().all(|&s| s));

    // log2(10_000 / 4) is about 11.3; a balanced-ish SAH tree over
    // uniform data should land near that, never at the degenerate
    // linear extreme.
    assert!(index.height() >= 12);
    assert!(index.height() <= 24);

    // All three modes agree on a batch of probes, inside and outside
    // the cube.
    let mut rng = StdRng::seed_from_u64(7);
    let mut deferred = NearestSurfaceQuery::new(&accel, TraversalMode::Deferred);
    let mut immediate = NearestSurfaceQuery::new(&accel, TraversalMode::Immediate);
    let mut adaptive = NearestSurfaceQuery::new(&accel, TraversalMode::Adaptive);
    for _ in 0..50 {
        let probe = Point3::new(
            rng.gen_range(-0.5..1.5),
            rng.gen_range(-0.5..1.5),
            rng.gen_range(-0.5..1.5),
        );
        let a = deferred.find(&accel, &probe, 2.0).unwrap().unwrap();
        let b = immediate.find(&accel, &probe, 2.0).unwrap().unwrap();
        let c = adaptive.find(&accel, &probe, 2.0).unwrap().unwrap();

        assert_eq!(a.triangle, b.triangle);
        assert_eq!(b.triangle, c.triangle);
        assert_relative_eq!(a.distance, b.distance, epsilon = 1e-12);
        assert_relative_eq!(b.distance, c.distance, epsilon = 1e-12);
    }
}

#[test]
fn adaptive_pruning_visits_fewer_nodes_than_fixed_radius() {
    let accel = random_soup(10_000, 42);

    // A generous initial radius from just outside the cube: the fixed
    // radius sphere overlaps most of the tree, while the shrinking one
    // collapses after the first nearby hit.
    let probe = Point3::new(1.2, 0.5, 0.5);

    let mut immediate = NearestSurfaceQuery::new(&accel, TraversalMode::Immediate);
    let mut adaptive = NearestSurfaceQuery::new(&accel, TraversalMode::Adaptive);

    let a = immediate.find(&accel, &probe, 5.0).unwrap().unwrap();
    let b = adaptive.find(&accel, &probe, 5.0).unwrap().unwrap();

    assert_eq!(a.triangle, b.triangle);
    assert!(adaptive.nodes_visited() < immediate.nodes_visited());
}

#[test]
fn radius_bounds_the_result() {
    let accel = unit_triangle();
    let probe = Point3::new(0.25, 0.25, 5.0);

    for mode in [
        TraversalMode::Deferred,
        TraversalMode::Immediate,
        TraversalMode::Adaptive,
    ] {
        let mut query = NearestSurfaceQuery::new(&accel, mode);

        // Strictly inside a 5.0 shell there is nothing.
        assert!(query.find(&accel, &probe, 4.999).unwrap().is_none());

        // Just past the true distance every mode lands on the same point.
        let hit = query.find(&accel, &probe, 5.0 + 1e-9).unwrap().unwrap();
        assert_relative_eq!(hit.point.x, 0.25, epsilon = 1e-12);
        assert_relative_eq!(hit.point.y, 0.25, epsilon = 1e-12);
        assert_relative_eq!(hit.point.z, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn degenerate_triangle_still_yields_a_finite_answer() {
    // Two collinear edges collapse the tangent frame; the closest point
    // falls back to the base vertex rather than producing NaN.
    let positions = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
    ];
    let faces = vec![[0u32, 1, 2]];
    let mut builder = IndexBuilder::new(4, 16);
    let accel = SurfaceAccel::build(&positions, &faces, &mut builder).unwrap();

    let mut query = NearestSurfaceQuery::new(&accel, TraversalMode::Adaptive);
    let hit = query
        .find(&accel, &Point3::new(0.0, 1.0, 0.0), 10.0)
        .unwrap()
        .unwrap();

    assert!(hit.distance.is_finite());
    assert_relative_eq!(hit.distance, 1.0, epsilon = 1e-12);
}

#[test]
fn empty_mesh_is_rejected_at_build_time() {
    let mut builder = IndexBuilder::new(4, 16);
    let result = SurfaceAccel::build(&[], &[], &mut builder);
    assert!(matches!(result, Err(ProximityError::EmptyMesh)));
}

#[test]
fn face_referencing_a_missing_vertex_is_rejected() {
    let positions = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let faces = vec![[0u32, 1, 9]];
    let mut builder = IndexBuilder::new(4, 16);
    let result = SurfaceAccel::build(&positions, &faces, &mut builder);
    assert!(matches!(
        result,
        Err(ProximityError::FaceIndexOutOfRange { face: 0, vertex: 9, .. })
    ));
}

#[test]
fn builder_reuse_across_meshes_gives_fresh_accels() {
    let mut builder = IndexBuilder::new(4, 1024);

    let small = random_soup_with(&mut builder, 100, 1);
    let large = random_soup_with(&mut builder, 1000, 2);

    assert_eq!(small.triangle_count(), 100);
    assert_eq!(large.triangle_count(), 1000);

    let mut query = NearestSurfaceQuery::new(&large, TraversalMode::Adaptive);
    assert!(query
        .find(&large, &Point3::new(0.5, 0.5, 0.5), 2.0)
        .unwrap()
        .is_some());
}

fn random_soup_with(builder: &mut IndexBuilder, count: usize, seed: u64) -> SurfaceAccel {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions = Vec::with_capacity(count * 3);
    let mut faces = Vec::with_capacity(count);
    for _ in 0..count {
        let base = positions.len() as u32;
        for _ in 0..3 {
            positions.push(Point3::new(
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
            ));
        }
        faces.push([base, base + 1, base + 2]);
    }
    SurfaceAccel::build(&positions, &faces, builder).unwrap()
}
