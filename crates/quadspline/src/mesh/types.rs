//! Arena node types: quadrants, triangles, and the owning `Mesh2D`.
//!
//! - `Quadrant`: axis-aligned rectangle with sampled corners; internal or leaf.
//! - `Triangle`: apex-centred wedge of a leaf, carrying an affine fit.
//! - Links between nodes are plain indices into the arena (`QuadId`, `TriId`).
//!   Neighbour links only ever point at same-level quadrants and never own them.

use nalgebra::Vector2;

use super::affine::{AffineFit, HalfPlane};
use crate::error::{MeshError, MeshResult};

/// Index of a quadrant in `Mesh2D`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuadId(pub usize);

/// Index of a triangle in `Mesh2D`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriId(pub usize);

/// Edge of a quadrant; also the orientation tag of the triangle bordering it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Down,
    Up,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Down, Side::Up];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Down => Side::Up,
            Side::Up => Side::Down,
        }
    }

    /// Corners on this edge, ordered low to high along it.
    ///
    /// Also names the two children of a quadrant that touch this edge.
    #[inline]
    pub fn corners(self) -> [Corner; 2] {
        match self {
            Side::Left => [Corner::LowerLeft, Corner::UpperLeft],
            Side::Right => [Corner::LowerRight, Corner::UpperRight],
            Side::Down => [Corner::LowerLeft, Corner::LowerRight],
            Side::Up => [Corner::UpperLeft, Corner::UpperRight],
        }
    }

    /// Left and right edges are vertical.
    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

/// Corner of a quadrant; also indexes its children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    LowerLeft,
    LowerRight,
    UpperRight,
    UpperLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::LowerLeft,
        Corner::LowerRight,
        Corner::UpperRight,
        Corner::UpperLeft,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_halves(right: bool, upper: bool) -> Corner {
        match (right, upper) {
            (false, false) => Corner::LowerLeft,
            (true, false) => Corner::LowerRight,
            (true, true) => Corner::UpperRight,
            (false, true) => Corner::UpperLeft,
        }
    }

    #[inline]
    pub fn is_right(self) -> bool {
        matches!(self, Corner::LowerRight | Corner::UpperRight)
    }

    #[inline]
    pub fn is_upper(self) -> bool {
        matches!(self, Corner::UpperLeft | Corner::UpperRight)
    }

    /// The edge joining two distinct adjacent corners; `None` for diagonals.
    pub fn edge_with(self, other: Corner) -> Option<Side> {
        match (self.is_right() == other.is_right(), self.is_upper() == other.is_upper()) {
            (true, false) => Some(if self.is_right() { Side::Right } else { Side::Left }),
            (false, true) => Some(if self.is_upper() { Side::Up } else { Side::Down }),
            _ => None,
        }
    }
}

/// Axis-aligned rectangle `[x_lo, x_hi] × [y_lo, y_hi]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x_lo: f64,
    pub y_lo: f64,
    pub x_hi: f64,
    pub y_hi: f64,
}

impl Rect {
    /// Finite bounds with `x_lo < x_hi` and `y_lo < y_hi`.
    pub fn new(x_lo: f64, y_lo: f64, x_hi: f64, y_hi: f64) -> MeshResult<Self> {
        let finite = [x_lo, y_lo, x_hi, y_hi].iter().all(|v| v.is_finite());
        if !finite || !(x_lo < x_hi) || !(y_lo < y_hi) {
            return Err(MeshError::InvalidDomain {
                x_lo,
                y_lo,
                x_hi,
                y_hi,
            });
        }
        Ok(Self {
            x_lo,
            y_lo,
            x_hi,
            y_hi,
        })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x_hi - self.x_lo
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y_hi - self.y_lo
    }

    #[inline]
    pub fn center(&self) -> Vector2<f64> {
        Vector2::new((self.x_lo + self.x_hi) * 0.5, (self.y_lo + self.y_hi) * 0.5)
    }

    #[inline]
    pub fn corner(&self, c: Corner) -> Vector2<f64> {
        Vector2::new(
            if c.is_right() { self.x_hi } else { self.x_lo },
            if c.is_upper() { self.y_hi } else { self.y_lo },
        )
    }

    /// Midpoint of one edge.
    #[inline]
    pub fn edge_midpoint(&self, side: Side) -> Vector2<f64> {
        let c = self.center();
        match side {
            Side::Left => Vector2::new(self.x_lo, c.y),
            Side::Right => Vector2::new(self.x_hi, c.y),
            Side::Down => Vector2::new(c.x, self.y_lo),
            Side::Up => Vector2::new(c.x, self.y_hi),
        }
    }

    /// The quarter containing corner `c`.
    pub fn child(&self, c: Corner) -> Rect {
        let m = self.center();
        let (x_lo, x_hi) = if c.is_right() { (m.x, self.x_hi) } else { (self.x_lo, m.x) };
        let (y_lo, y_hi) = if c.is_upper() { (m.y, self.y_hi) } else { (self.y_lo, m.y) };
        Rect {
            x_lo,
            y_lo,
            x_hi,
            y_hi,
        }
    }

    #[inline]
    pub fn contains(&self, p: Vector2<f64>) -> bool {
        p.x >= self.x_lo && p.x <= self.x_hi && p.y >= self.y_lo && p.y <= self.y_hi
    }
}

/// Lifecycle state of a quadrant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QuadState {
    /// Corners sampled, refinement not yet decided.
    Unrefined,
    /// Internal node. `pure == false` when some descendant was rolled back.
    Refined { children: [QuadId; 4], pure: bool },
    /// Leaf with one triangle per side, indexed by `Side`.
    Triangulated {
        triangles: [TriId; 4],
        rolled_back: bool,
    },
    /// Too small to subdivide at working precision.
    Degenerate,
}

/// A rectangular mesh node.
#[derive(Clone, Copy, Debug)]
pub struct Quadrant {
    pub rect: Rect,
    /// Sampled values, indexed by `Corner`.
    pub corners: [f64; 4],
    /// Sampled value at the centre; NaN until refinement reaches this node.
    pub center_value: f64,
    /// 1 at the root.
    pub level: u32,
    pub state: QuadState,
    /// Same-level neighbours, indexed by `Side`.
    pub neighbors: [Option<QuadId>; 4],
}

impl Quadrant {
    pub(crate) fn new(rect: Rect, corners: [f64; 4], level: u32) -> Self {
        Self {
            rect,
            corners,
            center_value: f64::NAN,
            level,
            state: QuadState::Unrefined,
            neighbors: [None; 4],
        }
    }

    #[inline]
    pub fn neighbor(&self, side: Side) -> Option<QuadId> {
        self.neighbors[side.index()]
    }

    #[inline]
    pub fn children(&self) -> Option<[QuadId; 4]> {
        match self.state {
            QuadState::Refined { children, .. } => Some(children),
            _ => None,
        }
    }

    #[inline]
    pub fn triangles(&self) -> Option<[TriId; 4]> {
        match self.state {
            QuadState::Triangulated { triangles, .. } => Some(triangles),
            _ => None,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.state, QuadState::Triangulated { .. })
    }
}

/// A sampled point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub p: Vector2<f64>,
    pub f: f64,
}

impl Vertex {
    #[inline]
    pub fn new(p: Vector2<f64>, f: f64) -> Self {
        Self { p, f }
    }
}

/// Affine piece of the overlay.
///
/// Vertices are `[low, high, apex]`: the two ends of the bordering edge in
/// increasing coordinate order, then the owning quadrant's centre.
#[derive(Clone, Debug)]
pub struct Triangle {
    pub side: Side,
    pub vertices: [Vertex; 3],
    pub fit: AffineFit,
    /// Half-planes of the spokes `apex→low` and `apex→high`.
    pub wedge: [HalfPlane; 2],
    pub quad: QuadId,
    /// Same-level quadrant across the bordering edge, if any.
    pub border: Option<QuadId>,
    pub children: Option<[TriId; 2]>,
}

impl Triangle {
    pub(crate) fn new(
        side: Side,
        vertices: [Vertex; 3],
        quad: QuadId,
        border: Option<QuadId>,
    ) -> MeshResult<Self> {
        let [low, high, apex] = vertices;
        let fit = AffineFit::through(apex, low, high).ok_or(MeshError::NonFiniteAffineFit {
            quad: quad.0,
            side,
        })?;
        let wedge = [
            HalfPlane::through(apex.p, low.p, high.p),
            HalfPlane::through(apex.p, high.p, low.p),
        ];
        Ok(Self {
            side,
            vertices,
            fit,
            wedge,
            quad,
            border,
            children: None,
        })
    }

    /// Closed containment within the apex wedge.
    ///
    /// Only meaningful for points already known to lie in the parent region.
    #[inline]
    pub fn contains(&self, p: Vector2<f64>) -> bool {
        self.wedge[0].contains(p) && self.wedge[1].contains(p)
    }

    /// Barycentric interpolation of the vertex samples; exact at each vertex.
    #[inline]
    pub fn value_at(&self, p: Vector2<f64>) -> f64 {
        let [a, b, c] = self.vertices;
        let ab = b.p - a.p;
        let ac = c.p - a.p;
        let ap = p - a.p;
        let det = ab.perp(&ac);
        let lb = ap.perp(&ac) / det;
        let lc = ab.perp(&ap) / det;
        (1.0 - lb - lc) * a.f + lb * b.f + lc * c.f
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn apex(&self) -> Vertex {
        self.vertices[2]
    }
}

/// Counters gathered while building a mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshStats {
    pub quadrants: usize,
    pub leaves: usize,
    pub triangles: usize,
    pub split_triangles: usize,
    pub evaluations: usize,
    pub max_level: u32,
    pub rollbacks: usize,
    pub impure: usize,
    pub capped: usize,
}

/// Immutable adaptive mesh. Quadrant 0 is the root.
#[derive(Clone, Debug)]
pub struct Mesh2D {
    pub(crate) quads: Vec<Quadrant>,
    pub(crate) tris: Vec<Triangle>,
    pub(crate) stats: MeshStats,
}

impl Mesh2D {
    #[inline]
    pub fn root(&self) -> QuadId {
        QuadId(0)
    }

    pub fn domain(&self) -> Rect {
        self.quads[0].rect
    }

    #[inline]
    pub fn quad(&self, id: QuadId) -> &Quadrant {
        &self.quads[id.0]
    }

    #[inline]
    pub fn triangle(&self, id: TriId) -> &Triangle {
        &self.tris[id.0]
    }

    pub fn quadrants(&self) -> &[Quadrant] {
        &self.quads
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.tris
    }

    /// Triangles that were not split; these tile the domain.
    pub fn leaf_triangles(&self) -> impl Iterator<Item = &Triangle> + '_ {
        self.tris.iter().filter(|t| t.is_leaf())
    }

    pub fn stats(&self) -> MeshStats {
        self.stats
    }

    /// Recount structural totals from the arena.
    pub(crate) fn tally(&mut self) {
        let s = &mut self.stats;
        s.quadrants = self.quads.len();
        s.leaves = self.quads.iter().filter(|q| q.is_leaf()).count();
        s.impure = self
            .quads
            .iter()
            .filter(|q| matches!(q.state, QuadState::Refined { pure: false, .. }))
            .count();
        s.max_level = self.quads.iter().map(|q| q.level).max().unwrap_or(0);
        s.triangles = self.tris.len();
        s.split_triangles = self.tris.iter().filter(|t| !t.is_leaf()).count();
    }
}
