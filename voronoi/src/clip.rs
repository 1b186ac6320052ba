//! Clipping the swept graph to the bounding rectangle.

use tracing::debug;

use crate::{
    geom::{Rect, Side, Vector},
    graph::{EdgeIdx, Graph},
    num::Tolerance,
    sites::Sites,
    Error,
};

/// A parametric interval along an edge's line, along with the sides (if any) that
/// were responsible for its ends.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Interval {
    t0: f64,
    side0: Option<Side>,
    t1: f64,
    side1: Option<Side>,
}

impl Interval {
    /// Narrows this interval to the part satisfying `p * t <= q`.
    ///
    /// Returns `false` if the interval becomes empty because the line is parallel
    /// to the constraint and entirely outside it.
    fn constrain(&mut self, p: f64, q: f64, side: Side) -> bool {
        if p == 0.0 {
            return q >= 0.0;
        }
        let t = q / p;
        if p < 0.0 {
            if t > self.t0 {
                self.t0 = t;
                self.side0 = Some(side);
            }
        } else if t < self.t1 {
            self.t1 = t;
            self.side1 = Some(side);
        }
        true
    }
}

/// Clips every edge of the graph to `rect`, using the Liang-Barsky algorithm.
///
/// Edges that miss the rectangle, or whose clipped length is within the tolerance
/// of zero, are marked as deleted. New endpoints are placed exactly on the side of
/// the rectangle that cut them. Returns the number of deleted edges.
pub fn clip(graph: &mut Graph, sites: &Sites, rect: &Rect, tol: Tolerance) -> Result<usize, Error> {
    let edges: Vec<_> = graph.live_edges().collect();
    let mut pruned = 0;
    for e in edges {
        if !clip_edge(graph, sites, rect, e, tol)? {
            graph.deleted[e.0] = true;
            pruned += 1;
        }
    }
    debug!(pruned, vertices = graph.vertices.len(), "clipped edges");
    Ok(pruned)
}

/// Clips a single edge, returning whether any of it survived.
fn clip_edge(
    graph: &mut Graph,
    sites: &Sites,
    rect: &Rect,
    e: EdgeIdx,
    tol: Tolerance,
) -> Result<bool, Error> {
    let (a, b) = graph.site_pair(e)?;
    let (l, r) = (sites[a], sites[b]);

    // The edge lies on the line through `m` in direction `d`. With `d` chosen this way,
    // the site of the first half-edge is on the right.
    let m = l.midpoint(&r);
    let d = Vector {
        x: r.y - l.y,
        y: l.x - r.x,
    };
    let dd = d.norm_sq();
    if dd == 0.0 {
        return Ok(false);
    }
    let param = |v| (graph.vertex(v) - m).dot(&d) / dd;

    let (first, second) = (e.first_half(), e.second_half());
    let mut interval = Interval {
        t0: graph.origin[first].map_or(f64::NEG_INFINITY, param),
        side0: None,
        t1: graph.origin[second].map_or(f64::INFINITY, param),
        side1: None,
    };

    let inside = interval.constrain(-d.x, m.x - rect.min.x, Side::Left)
        && interval.constrain(d.x, rect.max.x - m.x, Side::Right)
        && interval.constrain(-d.y, m.y - rect.min.y, Side::Bottom)
        && interval.constrain(d.y, rect.max.y - m.y, Side::Top);
    if !inside || interval.t0 > interval.t1 {
        return Ok(false);
    }

    if let Some(side) = interval.side0 {
        let v = graph.add_vertex(rect.snap(m.along(d, interval.t0), side));
        graph.origin[first] = Some(v);
    }
    if let Some(side) = interval.side1 {
        let v = graph.add_vertex(rect.snap(m.along(d, interval.t1), side));
        graph.origin[second] = Some(v);
    }

    match graph.endpoints(e) {
        Some((p, q)) => Ok(!p.close_to(&q, tol)),
        None => Ok(false),
    }
}
