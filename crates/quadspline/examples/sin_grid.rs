//! Approximate `2 + sin(3x)` on a rectangle and report mesh size and error.
//!
//! Usage:
//!   cargo run -p quadspline --example sin_grid -- 1e4
//!
//! Prints the mesh statistics, the worst error over a 41x41 grid, and the
//! integral along y against a unit weight at a few abscissae.

use quadspline::{build_mesh, integrate_along_y, Evaluable1D, PolySpline, Rect};

fn main() {
    let precision: f64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1e4);
    let f = |x: f64, _y: f64| 2.0 + (3.0 * x).sin();
    let domain = Rect::new(0.0, 0.0, 3.0, 1.0).unwrap();
    let mesh = build_mesh(&f, domain, precision).unwrap();
    println!("precision factor {precision:e}: {:?}", mesh.stats());

    let worst = mesh
        .sample_grid(41, 41)
        .into_iter()
        .map(|[x, y, v]| (v - f(x, y)).abs())
        .fold(0.0, f64::max);
    println!("max grid error {worst:.3e}");

    let weight = PolySpline::constant(0.0, 1.0, 1.0).unwrap();
    let g = integrate_along_y(&mesh, &weight).unwrap();
    println!("G has {} pieces of degree {}", g.num_pieces(), g.degree());
    for x in [0.0, 0.5, 1.0, 2.0, 3.0] {
        println!("  G({x}) = {:.8}  exact {:.8}", g.evaluate(x), f(x, 0.0));
    }
}
