//! Continuity overlay.
//!
//! A leaf's four triangles interpolate linearly along its edges. Where the
//! same-level quadrant across an edge is refined, that neighbour carries an
//! extra sample at the edge midpoint; the bordering triangle is split there
//! so both sides agree along the whole edge. Splitting recurses as long as
//! the quadrant across the new half-edge is itself refined.

use super::types::{Mesh2D, QuadId, QuadState, Quadrant, Side, TriId, Triangle, Vertex};
use crate::error::MeshResult;

/// Point the outward links of `children` at the matching children of each
/// refined same-level neighbour of `parent`.
pub(crate) fn link_children(quads: &mut [Quadrant], parent: QuadId, children: [QuadId; 4]) {
    let q = quads[parent.0];
    for side in Side::ALL {
        let Some(theirs) = q.neighbor(side).and_then(|n| quads[n.0].children()) else {
            continue;
        };
        let (ours, facing) = (side.corners(), side.opposite().corners());
        for i in 0..2 {
            quads[children[ours[i].index()].0].neighbors[side.index()] =
                Some(theirs[facing[i].index()]);
        }
    }
}

impl Mesh2D {
    /// Resolve neighbour links top-down and split every triangle facing a
    /// refined neighbour.
    pub(crate) fn overlay(&mut self) -> MeshResult<()> {
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            match self.quads[id.0].state {
                QuadState::Refined { children, .. } => {
                    link_children(&mut self.quads, id, children);
                    stack.extend(children);
                }
                QuadState::Triangulated { triangles, .. } => {
                    for side in Side::ALL {
                        let t = triangles[side.index()];
                        self.tris[t.0].border = self.quads[id.0].neighbor(side);
                        self.split(t)?;
                    }
                }
                QuadState::Unrefined | QuadState::Degenerate => {}
            }
        }
        Ok(())
    }

    fn split(&mut self, t: TriId) -> MeshResult<()> {
        let tri = &self.tris[t.0];
        let Some(theirs) = tri.border.and_then(|b| self.quads[b.0].children()) else {
            return Ok(());
        };
        let (side, quad) = (tri.side, tri.quad);
        let [low, high, apex] = tri.vertices;

        let [near_low, near_high] = side.opposite().corners();
        let low_child = theirs[near_low.index()];
        let high_child = theirs[near_high.index()];
        let across = &self.quads[low_child.0];
        let mid = Vertex::new(
            across.rect.corner(near_high),
            across.corners[near_high.index()],
        );

        let first = self.tris.len();
        self.tris
            .push(Triangle::new(side, [low, mid, apex], quad, Some(low_child))?);
        self.tris
            .push(Triangle::new(side, [mid, high, apex], quad, Some(high_child))?);
        let halves = [TriId(first), TriId(first + 1)];
        self.tris[t.0].children = Some(halves);
        for h in halves {
            self.split(h)?;
        }
        Ok(())
    }
}
