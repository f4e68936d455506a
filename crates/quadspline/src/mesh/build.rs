//! Recursive quadtree refinement.
//!
//! A quadrant is accepted as a leaf when the mean of its four corners
//! predicts the sampled centre at working precision. Otherwise it is split
//! into four children that reuse the centre sample and, where a refined
//! same-level neighbour already sampled them, the edge midpoints.
//!
//! Rollback: children are appended to the arena after every node that
//! exists when their parent splits, and refinement is depth-first. When a
//! child turns out degenerate, truncating both arenas to the marks taken
//! before the split discards the whole subtree.

use nalgebra::Vector2;
use tracing::{debug, info, warn};

use super::cfg::{is_unresolvable, within_precision, MeshCfg};
use super::overlay::link_children;
use super::types::{Corner, Mesh2D, MeshStats, QuadId, QuadState, Quadrant, Rect, Side, TriId, Triangle, Vertex};
use crate::error::{MeshError, MeshResult};
use crate::eval::Evaluable2D;

/// What a call to `refine` did with its quadrant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Leaf { rolled_back: bool },
    Subdivided { pure: bool },
    Degenerate,
}

/// Configured entry point for mesh construction.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeshBuilder {
    cfg: MeshCfg,
}

impl MeshBuilder {
    pub fn new(cfg: MeshCfg) -> Self {
        Self { cfg }
    }

    pub fn cfg(&self) -> MeshCfg {
        self.cfg
    }

    /// Refine `domain` against `f`, then lay the continuity overlay.
    pub fn build<E>(&self, f: &E, domain: Rect) -> MeshResult<Mesh2D>
    where
        E: Evaluable2D + ?Sized,
    {
        self.cfg.validate()?;
        // Re-validate: `Rect` fields are public.
        let domain = Rect::new(domain.x_lo, domain.y_lo, domain.x_hi, domain.y_hi)?;

        let mut run = Refiner {
            f,
            cfg: self.cfg,
            quads: Vec::new(),
            tris: Vec::new(),
            stats: MeshStats::default(),
        };
        let mut corners = [0.0; 4];
        for c in Corner::ALL {
            corners[c.index()] = run.sample(domain.corner(c))?;
        }
        run.quads.push(Quadrant::new(domain, corners, 1));
        if run.refine(QuadId(0))? == Outcome::Degenerate {
            return Err(MeshError::DegenerateRoot);
        }

        let mut mesh = Mesh2D {
            quads: run.quads,
            tris: run.tris,
            stats: run.stats,
        };
        mesh.overlay()?;
        mesh.tally();

        let s = mesh.stats;
        if s.capped > 0 {
            warn!(capped = s.capped, max_level = ?self.cfg.max_level, "refinement truncated by level cap");
        }
        info!(
            quadrants = s.quadrants,
            leaves = s.leaves,
            triangles = s.triangles,
            split = s.split_triangles,
            evaluations = s.evaluations,
            depth = s.max_level,
            rollbacks = s.rollbacks,
            "mesh built"
        );
        Ok(mesh)
    }
}

/// Build with default settings apart from `precision_factor`.
pub fn build_mesh<E>(f: &E, domain: Rect, precision_factor: f64) -> MeshResult<Mesh2D>
where
    E: Evaluable2D + ?Sized,
{
    MeshBuilder::new(MeshCfg::with_precision(precision_factor)).build(f, domain)
}

struct Refiner<'a, E: ?Sized> {
    f: &'a E,
    cfg: MeshCfg,
    quads: Vec<Quadrant>,
    tris: Vec<Triangle>,
    stats: MeshStats,
}

impl<E: Evaluable2D + ?Sized> Refiner<'_, E> {
    fn sample(&mut self, p: Vector2<f64>) -> MeshResult<f64> {
        self.stats.evaluations += 1;
        let value = self.f.evaluate(p.x, p.y);
        if !value.is_finite() {
            return Err(MeshError::NonFiniteSample {
                x: p.x,
                y: p.y,
                value,
            });
        }
        Ok(value)
    }

    fn refine(&mut self, id: QuadId) -> MeshResult<Outcome> {
        let q = self.quads[id.0];
        if is_unresolvable(&q.rect) {
            self.quads[id.0].state = QuadState::Degenerate;
            return Ok(Outcome::Degenerate);
        }

        let mid = self.sample(q.rect.center())?;
        self.quads[id.0].center_value = mid;
        let predicted = q.corners.iter().sum::<f64>() * 0.25;
        if within_precision(mid, predicted, self.cfg.precision_factor) {
            self.accept(id, false)?;
            return Ok(Outcome::Leaf { rolled_back: false });
        }
        if self.cfg.max_level.is_some_and(|cap| q.level >= cap) {
            self.stats.capped += 1;
            self.accept(id, false)?;
            return Ok(Outcome::Leaf { rolled_back: false });
        }

        let quad_mark = self.quads.len();
        let tri_mark = self.tris.len();
        let children = self.subdivide(id, mid)?;
        self.quads[id.0].state = QuadState::Refined {
            children,
            pure: true,
        };

        let mut pure = true;
        for child in children {
            match self.refine(child)? {
                Outcome::Degenerate => {
                    self.quads.truncate(quad_mark);
                    self.tris.truncate(tri_mark);
                    self.stats.rollbacks += 1;
                    debug!(
                        level = q.level,
                        x_lo = q.rect.x_lo,
                        y_lo = q.rect.y_lo,
                        width = q.rect.width(),
                        "degenerate child, subdivision rolled back"
                    );
                    self.accept(id, true)?;
                    return Ok(Outcome::Leaf { rolled_back: true });
                }
                Outcome::Leaf { rolled_back: true } | Outcome::Subdivided { pure: false } => {
                    pure = false;
                }
                Outcome::Leaf { rolled_back: false } | Outcome::Subdivided { pure: true } => {}
            }
        }
        if !pure {
            self.quads[id.0].state = QuadState::Refined {
                children,
                pure: false,
            };
        }
        Ok(Outcome::Subdivided { pure })
    }

    /// Append four children of `id`, wired to each other and to refined neighbours.
    fn subdivide(&mut self, id: QuadId, mid: f64) -> MeshResult<[QuadId; 4]> {
        let q = self.quads[id.0];

        let mut edge_mid = [0.0; 4];
        for side in Side::ALL {
            let across = q
                .neighbor(side)
                .and_then(|n| self.quads[n.0].children());
            edge_mid[side.index()] = match across {
                Some(theirs) => {
                    let [low, high] = side.opposite().corners();
                    self.quads[theirs[low.index()].0].corners[high.index()]
                }
                None => self.sample(q.rect.edge_midpoint(side))?,
            };
        }

        let first = self.quads.len();
        let children = [
            QuadId(first),
            QuadId(first + 1),
            QuadId(first + 2),
            QuadId(first + 3),
        ];
        for k in Corner::ALL {
            let mut corners = [0.0; 4];
            for j in Corner::ALL {
                corners[j.index()] = if j == k {
                    q.corners[k.index()]
                } else {
                    match k.edge_with(j) {
                        Some(side) => edge_mid[side.index()],
                        None => mid,
                    }
                };
            }
            self.quads
                .push(Quadrant::new(q.rect.child(k), corners, q.level + 1));
        }

        for side in Side::ALL {
            let opp = side.opposite();
            let (ours, theirs) = (side.corners(), opp.corners());
            for i in 0..2 {
                self.quads[children[ours[i].index()].0].neighbors[opp.index()] =
                    Some(children[theirs[i].index()]);
            }
        }
        link_children(&mut self.quads, id, children);
        Ok(children)
    }

    /// Turn `id` into a leaf with four apex-centred triangles.
    fn accept(&mut self, id: QuadId, rolled_back: bool) -> MeshResult<()> {
        let q = self.quads[id.0];
        let apex = Vertex::new(q.rect.center(), q.center_value);
        let mut triangles = [TriId(0); 4];
        for side in Side::ALL {
            let [lo, hi] = side.corners();
            let low = Vertex::new(q.rect.corner(lo), q.corners[lo.index()]);
            let high = Vertex::new(q.rect.corner(hi), q.corners[hi.index()]);
            triangles[side.index()] = TriId(self.tris.len());
            self.tris.push(Triangle::new(side, [low, high, apex], id, None)?);
        }
        self.quads[id.0].state = QuadState::Triangulated {
            triangles,
            rolled_back,
        };
        Ok(())
    }
}
