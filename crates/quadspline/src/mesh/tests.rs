use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::OnceLock;

use nalgebra::{vector, Vector2};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::*;
use crate::error::MeshError;

fn unit() -> Rect {
    Rect::new(0.0, 0.0, 1.0, 1.0).unwrap()
}

/// Bounded away from zero so the relative acceptance test converges quickly.
fn wavy(x: f64, y: f64) -> f64 {
    2.0 + (3.0 * x).sin() * (2.0 * y).cos() + 0.25 * x * y
}

fn wavy_mesh() -> &'static Mesh2D {
    static MESH: OnceLock<Mesh2D> = OnceLock::new();
    MESH.get_or_init(|| {
        let domain = Rect::new(0.0, 0.0, 2.0, 2.0).unwrap();
        build_mesh(&wavy, domain, 1e5).unwrap()
    })
}

/// Barycentric coordinates of `p` in `t`.
fn barycentric(t: &Triangle, p: Vector2<f64>) -> [f64; 3] {
    let [a, b, c] = t.vertices.map(|v| v.p);
    let det = (b - a).perp(&(c - a));
    let l1 = (p - a).perp(&(c - a)) / det;
    let l2 = (b - a).perp(&(p - a)) / det;
    [1.0 - l1 - l2, l1, l2]
}

/// Largest disagreement between a leaf triangle's own fit and the located
/// value at points along its edges.
fn max_seam_gap(mesh: &Mesh2D) -> f64 {
    let mut worst: f64 = 0.0;
    for t in mesh.leaf_triangles() {
        let [a, b, c] = t.vertices.map(|v| v.p);
        for (p, q) in [(a, b), (b, c), (c, a)] {
            for s in [0.25, 0.5, 0.75] {
                let z = p + (q - p) * s;
                let gap = (t.value_at(z) - mesh.evaluate(z.x, z.y)).abs();
                worst = worst.max(gap);
            }
        }
    }
    worst
}

#[test]
fn affine_function_needs_one_quadrant() {
    let mesh = build_mesh(&|x: f64, y: f64| x + y, unit(), 1.0).unwrap();
    let s = mesh.stats();
    assert_eq!(s.quadrants, 1);
    assert_eq!(s.leaves, 1);
    assert_eq!(s.triangles, 4);
    assert_eq!(s.split_triangles, 0);
    // 4 corners + centre.
    assert_eq!(s.evaluations, 5);
    assert_eq!(mesh.evaluate(0.5, 0.5), 1.0);
    for &(x, y) in &[(0.1, 0.2), (0.9, 0.3), (0.5, 0.99), (0.0, 0.0), (1.0, 1.0)] {
        assert!((mesh.evaluate(x, y) - (x + y)).abs() < 1e-12);
    }
}

#[test]
fn leaf_triangles_have_expected_orientation() {
    let mesh = build_mesh(&|x: f64, y: f64| 2.0 * x - y, unit(), 1.0).unwrap();
    let tris = mesh.quad(mesh.root()).triangles().unwrap();
    for side in Side::ALL {
        let t = mesh.triangle(tris[side.index()]);
        assert_eq!(t.side, side);
        assert_eq!(t.apex().p, vector![0.5, 0.5]);
        assert!(t.border.is_none());
    }
    let left = mesh.triangle(tris[Side::Left.index()]);
    assert_eq!(left.vertices[0].p, vector![0.0, 0.0]);
    assert_eq!(left.vertices[1].p, vector![0.0, 1.0]);
    let up = mesh.triangle(tris[Side::Up.index()]);
    assert_eq!(up.vertices[0].p, vector![0.0, 1.0]);
    assert_eq!(up.vertices[1].p, vector![1.0, 1.0]);
}

#[test]
fn curved_function_refines_and_counts_add_up() {
    let mesh = wavy_mesh();
    let s = mesh.stats();
    assert!(s.quadrants > 1);
    assert_eq!((s.quadrants - 1) % 4, 0);
    assert_eq!(s.triangles, 4 * s.leaves + 2 * s.split_triangles);
    assert!(s.max_level > 1);
    assert_eq!(s.rollbacks, 0);
    assert_eq!(s.impure, 0);
    assert!(mesh.quadrants().iter().all(|q| !matches!(
        q.state,
        QuadState::Unrefined | QuadState::Degenerate
    )));
}

fn assert_samples_exact(mesh: &Mesh2D) {
    for q in mesh.quadrants().iter().filter(|q| q.is_leaf()) {
        let c = q.rect.center();
        assert_eq!(mesh.evaluate(c.x, c.y), q.center_value);
        for k in Corner::ALL {
            let p = q.rect.corner(k);
            assert_eq!(mesh.evaluate(p.x, p.y), q.corners[k.index()], "corner {p:?}");
        }
    }
}

#[test]
fn samples_interpolate_exactly() {
    assert_samples_exact(wavy_mesh());
}

#[test]
fn samples_interpolate_exactly_on_uneven_domains() {
    let f = |x: f64, y: f64| 1.5 + (2.0 * x).sin() * (1.3 * y).cos() + 0.1 * x * y;
    for domain in [
        Rect::new(0.1, -0.37, 1.93, 2.71).unwrap(),
        Rect::new(-3.3, 0.7, -1.1, 0.9).unwrap(),
        Rect::new(1.0e4 + 0.3, -2.9, 1.0e4 + 1.7, -1.3).unwrap(),
    ] {
        let mesh = build_mesh(&f, domain, 1e4).unwrap();
        assert!(mesh.stats().leaves > 1);
        assert_samples_exact(&mesh);
    }
}

#[test]
fn overlay_is_continuous() {
    let mesh = wavy_mesh();
    assert!(mesh.stats().split_triangles > 0);
    assert!(max_seam_gap(mesh) < 1e-9);
}

#[test]
fn neighbour_links_are_symmetric_and_adjacent() {
    let mesh = wavy_mesh();
    for (i, q) in mesh.quadrants().iter().enumerate() {
        for side in Side::ALL {
            let Some(n) = q.neighbor(side) else { continue };
            let other = mesh.quad(n);
            assert_eq!(other.level, q.level);
            assert_eq!(other.neighbor(side.opposite()), Some(QuadId(i)));
            let (a, b) = (q.rect, other.rect);
            match side {
                Side::Left => assert!(b.x_hi == a.x_lo && b.y_lo == a.y_lo && b.y_hi == a.y_hi),
                Side::Right => assert!(b.x_lo == a.x_hi && b.y_lo == a.y_lo && b.y_hi == a.y_hi),
                Side::Down => assert!(b.y_hi == a.y_lo && b.x_lo == a.x_lo && b.x_hi == a.x_hi),
                Side::Up => assert!(b.y_lo == a.y_hi && b.x_lo == a.x_lo && b.x_hi == a.x_hi),
            }
        }
    }
}

#[test]
fn located_triangle_contains_point() {
    let mesh = wavy_mesh();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..2000 {
        let p = vector![rng.gen_range(0.0..2.0), rng.gen_range(0.0..2.0)];
        let t = mesh.locate(p.x, p.y).unwrap();
        let tri = mesh.triangle(t);
        assert!(tri.is_leaf());
        assert!(barycentric(tri, p).iter().all(|&l| l >= -1e-9));
    }
}

#[test]
fn edge_samples_are_shared_not_repeated() {
    let seen = RefCell::new(HashSet::new());
    let f = |x: f64, y: f64| {
        seen.borrow_mut().insert((x.to_bits(), y.to_bits()));
        (x * y).exp() + 2.0 - x
    };
    let mesh = build_mesh(&f, unit(), 1e3).unwrap();
    assert!(mesh.stats().quadrants > 5);
    assert_eq!(seen.borrow().len(), mesh.stats().evaluations);
}

#[test]
fn corner_spike_rolls_back_locally() {
    let domain = Rect::new(1.0, 1.0, 2.0, 2.0).unwrap();
    let spike = |x: f64, y: f64| if x == 1.0 && y == 1.0 { 1.0 } else { 0.0 };
    let mesh = build_mesh(&spike, domain, 1.0).unwrap();
    let s = mesh.stats();
    assert_eq!(s.rollbacks, 1);
    assert!(s.impure >= 1);
    assert!(s.max_level > 10);
    assert!(mesh
        .quadrants()
        .iter()
        .any(|q| matches!(q.state, QuadState::Triangulated { rolled_back: true, .. })));

    // No dangling indices after truncation.
    let nq = mesh.quadrants().len();
    for q in mesh.quadrants() {
        assert!(q.neighbors.iter().flatten().all(|n| n.0 < nq));
    }
    assert!(mesh.triangles().iter().all(|t| t.quad.0 < nq));

    assert_eq!(mesh.evaluate(1.75, 1.75), 0.0);
    assert_eq!(mesh.evaluate(1.2, 1.9), 0.0);
    assert!((mesh.evaluate(1.0, 1.0) - 1.0).abs() < 1e-6);
    assert!(max_seam_gap(&mesh) < 1e-6);
}

#[test]
fn level_cap_truncates() {
    let cfg = MeshCfg::with_precision(1.0).max_level(3);
    let mesh = MeshBuilder::new(cfg).build(&wavy, unit()).unwrap();
    let s = mesh.stats();
    assert!(s.max_level <= 3);
    assert!(s.capped > 0);
    assert!(max_seam_gap(&mesh) < 1e-9);
}

#[test]
fn construction_errors() {
    assert!(matches!(
        Rect::new(1.0, 0.0, 0.0, 1.0),
        Err(MeshError::InvalidDomain { .. })
    ));
    assert!(matches!(
        build_mesh(&|x: f64, _y: f64| x, unit(), 0.0),
        Err(MeshError::InvalidPrecision(_))
    ));
    let thin = Rect::new(1.0, 0.0, 1.0 + 1e-9, 1.0).unwrap();
    assert!(matches!(
        build_mesh(&|x: f64, y: f64| x * y, thin, 1.0),
        Err(MeshError::DegenerateRoot)
    ));
    let nan_at_centre = |x: f64, y: f64| if x == 0.5 && y == 0.5 { f64::NAN } else { x };
    assert!(matches!(
        build_mesh(&nan_at_centre, unit(), 1.0),
        Err(MeshError::NonFiniteSample { x, y, .. }) if x == 0.5 && y == 0.5
    ));
}

#[test]
fn grid_sampling_covers_domain() {
    let mesh = build_mesh(&|x: f64, y: f64| x - y, unit(), 1.0).unwrap();
    let grid = mesh.sample_grid(3, 2);
    assert_eq!(grid.len(), 6);
    assert_eq!(grid[0], [0.0, 0.0, 0.0]);
    assert_eq!(grid[2][0], 1.0);
    assert_eq!(grid[5][..2], [1.0, 1.0]);
    for [x, y, v] in grid {
        assert!((v - (x - y)).abs() < 1e-12);
    }
    assert_eq!(mesh.sample_grid(1, 1), vec![[0.5, 0.5, 0.0]]);
}

#[test]
fn mesh_is_evaluable() {
    use crate::eval::Evaluable2D;
    let mesh = build_mesh(&|x: f64, y: f64| 3.0 * x + y, unit(), 1.0).unwrap();
    let e: &dyn Evaluable2D = &mesh;
    assert!((e.evaluate(0.25, 0.75) - 1.5).abs() < 1e-12);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_point_has_exactly_one_leaf(x in 0.0f64..2.0, y in 0.0f64..2.0) {
        let mesh = wavy_mesh();
        let p = vector![x, y];
        let t = mesh.locate(x, y).unwrap();
        prop_assert!(barycentric(mesh.triangle(t), p).iter().all(|&l| l >= -1e-9));
        let strictly_inside = mesh
            .leaf_triangles()
            .filter(|tri| barycentric(tri, p).iter().all(|&l| l > 1e-9))
            .count();
        prop_assert!(strictly_inside <= 1);
    }

    #[test]
    fn random_smooth_functions_stay_continuous(a in 0.5f64..4.0, b in 0.5f64..4.0, pf in 1e4f64..1e6) {
        let f = move |x: f64, y: f64| 3.0 + (a * x).sin() * (b * y).cos();
        let mesh = build_mesh(&f, unit(), pf).unwrap();
        prop_assert!(max_seam_gap(&mesh) < 1e-9);
    }
}
