//! Per-site polygons and neighbor lists, read off the finished graph.

use serde::Serialize;
use tracing::debug;

use crate::{
    geom::Point,
    graph::{Face, Graph},
    num::Tolerance,
    sites::SiteIdx,
    Error,
};

/// The part of the diagram belonging to a single site.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Cell {
    points: Vec<Point>,
    neighbors: Vec<SiteIdx>,
}

impl Cell {
    /// The cell's vertices, in counter-clockwise order.
    ///
    /// If the cell touches the bounding rectangle and border edges weren't requested,
    /// the rectangle's corners are missing from this list.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The sites whose cells share an edge with this one, in increasing order.
    pub fn neighbors(&self) -> &[SiteIdx] {
        &self.neighbors
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The signed area of the polygon through this cell's points.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let p = self.points[i];
                let q = self.points[(i + 1) % n];
                p.x * q.y - q.x * p.y
            })
            .sum();
        twice / 2.0
    }

    /// The centroid of the polygon through this cell's points.
    ///
    /// For polygons with (nearly) zero area, this is the average of the points instead.
    /// Returns `None` for an empty cell.
    pub fn centroid(&self) -> Option<Point> {
        let n = self.points.len();
        if n == 0 {
            return None;
        }
        let origin = self.points[0];
        let mut area = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 1..n.saturating_sub(1) {
            let a = self.points[i] - origin;
            let b = self.points[i + 1] - origin;
            let w = a.cross(&b);
            area += w;
            cx += w * (a.x + b.x);
            cy += w * (a.y + b.y);
        }
        if area.abs() > f64::EPSILON {
            Some(Point::new(
                origin.x + cx / (3.0 * area),
                origin.y + cy / (3.0 * area),
            ))
        } else {
            let sum = self
                .points
                .iter()
                .fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
            Some(Point::new(sum.0 / n as f64, sum.1 / n as f64))
        }
    }

    /// Is `p` inside (or within the tolerance of) the polygon through this cell's points?
    ///
    /// Cells with fewer than three points contain nothing.
    pub fn contains(&self, p: Point, tol: Tolerance) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        (0..n).all(|i| {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let side = b - a;
            side.cross(&(p - a)) >= -tol.eps * side.norm_sq().sqrt()
        })
    }
}

/// Builds a cell for each of `n_sites` sites, from every live edge in the graph.
pub fn extract(graph: &Graph, n_sites: usize, tol: Tolerance) -> Result<Vec<Cell>, Error> {
    let mut cells = vec![Cell::default(); n_sites];
    for e in graph.live_edges() {
        let (p, q) = graph
            .endpoints(e)
            .ok_or_else(|| Error::Internal(format!("{e:?} survived clipping without endpoints")))?;

        for face in graph.faces(e) {
            let Face::Site(s) = face else { continue };
            let points = &mut cells[s.0].points;
            for v in [p, q] {
                if !points.iter().any(|w| w.close_to(&v, tol)) {
                    points.push(v);
                }
            }
        }

        if !graph.is_border(e) {
            let (a, b) = graph.site_pair(e)?;
            cells[a.0].neighbors.push(b);
            cells[b.0].neighbors.push(a);
        }
    }

    for cell in &mut cells {
        cell.neighbors.sort();
        cell.neighbors.dedup();
        sort_around_center(&mut cell.points);
    }
    debug!(
        cells = cells.iter().filter(|c| !c.is_empty()).count(),
        "extracted cells"
    );
    Ok(cells)
}

fn sort_around_center(points: &mut [Point]) {
    if points.is_empty() {
        return;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
    let center = Point::new(sx / n, sy / n);
    let angle = |p: &Point| (p.y - center.y).atan2(p.x - center.x);
    points.sort_by(|a, b| angle(a).total_cmp(&angle(b)));
}
