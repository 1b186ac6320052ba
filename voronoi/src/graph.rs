//! The half-edge graph that the sweep produces and the later stages refine.

use serde::Serialize;

use crate::{
    geom::Point,
    sites::SiteIdx,
    Error,
};

/// What lies on one side of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Face {
    Site(SiteIdx),
    /// The outside of the bounding rectangle. Only border edges have this face.
    Outside,
}

impl Face {
    pub fn site(self) -> Option<SiteIdx> {
        match self {
            Face::Site(s) => Some(s),
            Face::Outside => None,
        }
    }
}

#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VertexIdx(pub usize);

impl std::fmt::Debug for VertexIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v_{}", self.0)
    }
}

#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdgeIdx(pub usize);

impl std::fmt::Debug for EdgeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e_{}", self.0)
    }
}

impl EdgeIdx {
    pub fn first_half(self) -> HalfEdgeIdx {
        HalfEdgeIdx {
            idx: self,
            first_half: true,
        }
    }

    pub fn second_half(self) -> HalfEdgeIdx {
        HalfEdgeIdx {
            idx: self,
            first_half: false,
        }
    }
}

/// One direction of an edge.
///
/// The first half runs from the edge's first origin to its second origin; the
/// second half runs back. Each half has its face on its right-hand side.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct HalfEdgeIdx {
    idx: EdgeIdx,
    first_half: bool,
}

impl std::fmt::Debug for HalfEdgeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.first_half {
            write!(f, "e{}->", self.idx.0)
        } else {
            write!(f, "e{}<-", self.idx.0)
        }
    }
}

/// Per-half-edge data, indexed by [`HalfEdgeIdx`].
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct EdgeVec<T> {
    pub start: Vec<T>,
    pub end: Vec<T>,
}

impl<T> Default for EdgeVec<T> {
    fn default() -> Self {
        Self {
            start: Vec::new(),
            end: Vec::new(),
        }
    }
}

impl<T> EdgeVec<T> {
    fn push(&mut self, start: T, end: T) {
        self.start.push(start);
        self.end.push(end);
    }

    fn swap_halves(&mut self, idx: EdgeIdx) {
        std::mem::swap(&mut self.start[idx.0], &mut self.end[idx.0]);
    }
}

impl<T> std::ops::Index<HalfEdgeIdx> for EdgeVec<T> {
    type Output = T;

    fn index(&self, index: HalfEdgeIdx) -> &Self::Output {
        if index.first_half {
            &self.start[index.idx.0]
        } else {
            &self.end[index.idx.0]
        }
    }
}

impl<T> std::ops::IndexMut<HalfEdgeIdx> for EdgeVec<T> {
    fn index_mut(&mut self, index: HalfEdgeIdx) -> &mut T {
        if index.first_half {
            &mut self.start[index.idx.0]
        } else {
            &mut self.end[index.idx.0]
        }
    }
}

/// A doubly-connected edge list, minus the next/prev pointers.
///
/// Edges are created in twin pairs and are never removed from the arena; the
/// clipper marks the ones that don't survive as deleted.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    pub vertices: Vec<Point>,
    /// The vertex each half-edge starts at. During the sweep, edges may still be
    /// missing one or both of these.
    pub origin: EdgeVec<Option<VertexIdx>>,
    /// The face on the right-hand side of each half-edge.
    pub face: EdgeVec<Face>,
    pub deleted: Vec<bool>,
}

impl Graph {
    pub fn add_vertex(&mut self, p: Point) -> VertexIdx {
        self.vertices.push(p);
        VertexIdx(self.vertices.len() - 1)
    }

    pub fn vertex(&self, v: VertexIdx) -> Point {
        self.vertices[v.0]
    }

    pub fn add_edge(&mut self, right: Face, left: Face) -> EdgeIdx {
        self.origin.push(None, None);
        self.face.push(right, left);
        self.deleted.push(false);
        EdgeIdx(self.deleted.len() - 1)
    }

    /// Adds an edge on the bisector of two sites, with no endpoints yet.
    pub fn add_site_edge(&mut self, left: SiteIdx, right: SiteIdx) -> EdgeIdx {
        self.add_edge(Face::Site(left), Face::Site(right))
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeIdx> {
        (0..self.deleted.len()).map(EdgeIdx)
    }

    pub fn live_edges(&self) -> impl Iterator<Item = EdgeIdx> + '_ {
        self.edges().filter(|e| !self.deleted[e.0])
    }

    pub fn faces(&self, e: EdgeIdx) -> [Face; 2] {
        [self.face[e.first_half()], self.face[e.second_half()]]
    }

    pub fn is_border(&self, e: EdgeIdx) -> bool {
        self.faces(e).contains(&Face::Outside)
    }

    /// Both endpoints of an edge, if it has them.
    pub fn endpoints(&self, e: EdgeIdx) -> Option<(Point, Point)> {
        let a = self.origin[e.first_half()]?;
        let b = self.origin[e.second_half()]?;
        Some((self.vertex(a), self.vertex(b)))
    }

    /// Records that the bisector of `left` and `right`, traced from the point of view of
    /// the sweep, starts at `v`.
    ///
    /// The first endpoint an edge receives fixes its orientation: the edge runs away from
    /// that vertex with `left` on its right-hand side. Subsequent endpoints are assigned
    /// according to whether they were reported in the same orientation.
    pub fn set_start(&mut self, e: EdgeIdx, left: SiteIdx, right: SiteIdx, v: VertexIdx) {
        let (first, second) = (e.first_half(), e.second_half());
        if self.origin[first].is_none() && self.origin[second].is_none() {
            self.origin[first] = Some(v);
            self.face[first] = Face::Site(left);
            self.face[second] = Face::Site(right);
        } else if self.face[first] == Face::Site(right) {
            self.origin[second] = Some(v);
        } else {
            self.origin[first] = Some(v);
        }
    }

    /// Records that the bisector of `left` and `right` ends at `v`.
    pub fn set_end(&mut self, e: EdgeIdx, left: SiteIdx, right: SiteIdx, v: VertexIdx) {
        self.set_start(e, right, left, v);
    }

    /// Reflects the whole graph across the diagonal `x == y`.
    ///
    /// Reflection reverses orientation, so we also reverse every edge in order to
    /// keep faces on the right.
    pub fn transpose(&mut self) {
        for v in &mut self.vertices {
            *v = v.transposed();
        }
        for e in self.edges() {
            self.origin.swap_halves(e);
        }
    }

    /// The two sites on either side of a non-border edge.
    pub fn site_pair(&self, e: EdgeIdx) -> Result<(SiteIdx, SiteIdx), Error> {
        match self.faces(e) {
            [Face::Site(a), Face::Site(b)] if a != b => Ok((a, b)),
            faces => Err(Error::Internal(format!(
                "{e:?} has invalid faces {faces:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_start_and_end() {
        let mut g = Graph::default();
        let (a, b) = (SiteIdx(0), SiteIdx(1));
        let v0 = g.add_vertex(Point::new(0.0, 0.0));
        let v1 = g.add_vertex(Point::new(1.0, 0.0));

        // The first endpoint fixes the orientation...
        let e = g.add_site_edge(a, b);
        g.set_end(e, a, b, v0);
        assert_eq!(g.faces(e), [Face::Site(b), Face::Site(a)]);
        assert_eq!(g.origin[e.first_half()], Some(v0));

        // ...and the second one goes on the other end, whichever way it's reported.
        g.set_start(e, a, b, v1);
        assert_eq!(g.origin[e.second_half()], Some(v1));
        assert_eq!(
            g.endpoints(e),
            Some((Point::new(0.0, 0.0), Point::new(1.0, 0.0)))
        );

        let e = g.add_site_edge(a, b);
        g.set_start(e, a, b, v0);
        g.set_end(e, a, b, v1);
        assert_eq!(g.faces(e), [Face::Site(a), Face::Site(b)]);
        assert_eq!(g.origin[e.first_half()], Some(v0));
        assert_eq!(g.origin[e.second_half()], Some(v1));
    }

    #[test]
    fn transpose() {
        let mut g = Graph::default();
        let e = g.add_site_edge(SiteIdx(0), SiteIdx(1));
        let v0 = g.add_vertex(Point::new(1.0, 2.0));
        let v1 = g.add_vertex(Point::new(3.0, 4.0));
        g.set_start(e, SiteIdx(0), SiteIdx(1), v0);
        g.set_end(e, SiteIdx(0), SiteIdx(1), v1);

        g.transpose();
        assert_eq!(
            g.endpoints(e),
            Some((Point::new(4.0, 3.0), Point::new(2.0, 1.0)))
        );
        assert_eq!(g.faces(e), [Face::Site(SiteIdx(0)), Face::Site(SiteIdx(1))]);
        assert!(!g.is_border(e));
    }

    #[test]
    fn site_pair() {
        let mut g = Graph::default();
        let e = g.add_site_edge(SiteIdx(0), SiteIdx(1));
        assert_eq!(g.site_pair(e), Ok((SiteIdx(0), SiteIdx(1))));

        let border = g.add_edge(Face::Site(SiteIdx(0)), Face::Outside);
        assert!(g.is_border(border));
        assert!(g.site_pair(border).is_err());

        let bad = g.add_site_edge(SiteIdx(2), SiteIdx(2));
        assert!(matches!(g.site_pair(bad), Err(Error::Internal(_))));
    }
}
