//! What happens to cells that touch the bounding rectangle.

use tracing::debug;

use crate::{
    geom::{Point, Rect},
    graph::{Face, Graph, VertexIdx},
    num::Tolerance,
    sites::{SiteIdx, Sites},
};

/// A finishing pass over the clipped graph, run before cells are extracted.
pub trait FinalizeCells: std::fmt::Debug {
    /// Modifies the graph in place, returning the number of edges added.
    fn finalize(
        &self,
        graph: &mut Graph,
        sites: &Sites,
        active: &[bool],
        rect: &Rect,
        tol: Tolerance,
    ) -> usize;
}

/// Leaves cells that touch the rectangle open: their boundary includes only the
/// points where Voronoi edges cross the rectangle, and not the rectangle's corners.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenCells;

impl FinalizeCells for OpenCells {
    fn finalize(&self, _: &mut Graph, _: &Sites, _: &[bool], _: &Rect, _: Tolerance) -> usize {
        0
    }
}

/// Closes off cells along the rectangle by adding border edges, so that the cells
/// tile the rectangle exactly.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClosedCells;

impl FinalizeCells for ClosedCells {
    fn finalize(
        &self,
        graph: &mut Graph,
        sites: &Sites,
        active: &[bool],
        rect: &Rect,
        tol: Tolerance,
    ) -> usize {
        let owners: Vec<SiteIdx> = sites.indices().filter(|s| active[s.0]).collect();
        if owners.is_empty() {
            return 0;
        }

        let ring = perimeter_ring(graph, rect, tol);
        for (k, &va) in ring.iter().enumerate() {
            let vb = ring[(k + 1) % ring.len()];
            let mid = graph.vertex(va).midpoint(&graph.vertex(vb));
            let owner = nearest(sites, &owners, mid);

            // The ring runs counter-clockwise, so walking it backwards keeps the
            // rectangle's interior on the right.
            let e = graph.add_edge(Face::Site(owner), Face::Outside);
            graph.origin[e.first_half()] = Some(vb);
            graph.origin[e.second_half()] = Some(va);
        }
        debug!(added = ring.len(), "closed border");
        ring.len()
    }
}

/// The rectangle's corners and every edge endpoint on its boundary, in counter-clockwise
/// order and without repeats.
fn perimeter_ring(graph: &mut Graph, rect: &Rect, tol: Tolerance) -> Vec<VertexIdx> {
    let mut on_border: Vec<(f64, VertexIdx)> = Vec::new();
    for e in graph.live_edges() {
        for v in [graph.origin[e.first_half()], graph.origin[e.second_half()]]
            .into_iter()
            .flatten()
        {
            if let Some(t) = rect.perimeter_position(graph.vertex(v), tol) {
                on_border.push((t, v));
            }
        }
    }
    for corner in rect.corners() {
        let v = graph.add_vertex(corner);
        if let Some(t) = rect.perimeter_position(corner, tol) {
            on_border.push((t, v));
        }
    }
    on_border.sort_by(|(s, v), (t, w)| s.total_cmp(t).then(v.cmp(w)));

    let mut ring: Vec<VertexIdx> = Vec::with_capacity(on_border.len());
    for (_, v) in on_border {
        let p = graph.vertex(v);
        if ring
            .last()
            .map_or(true, |&last| !graph.vertex(last).close_to(&p, tol))
        {
            ring.push(v);
        }
    }
    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if ring.len() > 1 && graph.vertex(first).close_to(&graph.vertex(last), tol) {
            ring.pop();
        }
    }
    ring
}

/// The closest of `candidates` to `p`, preferring lower indices on ties.
fn nearest(sites: &Sites, candidates: &[SiteIdx], p: Point) -> SiteIdx {
    let mut best = candidates[0];
    for &s in &candidates[1..] {
        let (a, b) = (sites[best], sites[s]);
        // Is `p` strictly on `b`'s side of their bisector?
        if (b - a).dot(&(p - a.midpoint(&b))) > 0.0 {
            best = s;
        }
    }
    best
}
