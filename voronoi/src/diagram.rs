use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    border::{ClosedCells, FinalizeCells, OpenCells},
    cells::{self, Cell},
    clip::clip,
    geom::{Point, Rect},
    graph::Face,
    num::Tolerance,
    sites::{SiteIdx, Sites},
    sweep::{sweep, Swept},
    Error,
};

/// What to do with cells that touch the bounding rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderMode {
    /// Leave them open: a cell's points include only the places where its edges
    /// meet the rectangle.
    #[default]
    Open,
    /// Close them off with edges along the rectangle, so that the cells tile it.
    Closed,
}

impl BorderMode {
    fn finalizer(self) -> &'static dyn FinalizeCells {
        match self {
            BorderMode::Open => &OpenCells,
            BorderMode::Closed => &ClosedCells,
        }
    }
}

/// The direction of the sweep line's motion.
///
/// The resulting diagram is the same either way (up to rounding). Sweeping
/// horizontally can be faster if the sites are spread out mostly along `y`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepAxis {
    /// Sweep in the direction of increasing `y`.
    #[default]
    Vertical,
    /// Sweep in the direction of increasing `x`.
    Horizontal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub border: BorderMode,
    pub axis: SweepAxis,
}

/// A surviving edge of the diagram.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Edge {
    pub start: Point,
    pub end: Point,
    /// The faces on the right and on the left of the edge, looking from `start`
    /// towards `end`.
    pub faces: [Face; 2],
}

impl Edge {
    /// Does this edge run along the bounding rectangle, closing off a cell?
    pub fn is_border(&self) -> bool {
        self.faces.contains(&Face::Outside)
    }

    pub fn length(&self) -> f64 {
        self.start.dist_sq(&self.end).sqrt()
    }
}

/// A Voronoi diagram, clipped to a rectangle.
#[derive(Clone, Debug, Serialize)]
pub struct Diagram {
    rect: Rect,
    sites: Vec<Point>,
    active: Vec<bool>,
    cells: Vec<Cell>,
    edges: Vec<Edge>,
}

impl Diagram {
    /// Computes the Voronoi diagram of `sites`, clipped to `rect`.
    ///
    /// Sites don't need to be inside `rect`, and they don't need to be distinct.
    /// When several sites coincide (up to a small absolute tolerance), the first one
    /// in sweep order gets the cell and the others get empty cells.
    pub fn build<P: Into<Point>>(
        sites: impl IntoIterator<Item = P>,
        rect: Rect,
        options: Options,
    ) -> Result<Diagram, Error> {
        rect.validate()?;
        let input = Sites::new(sites)?;
        let tol = Tolerance::DEFAULT;

        // Everything internal sweeps along `y`, so for a horizontal sweep we reflect
        // the input and then reflect the output back.
        let transpose = options.axis == SweepAxis::Horizontal;
        let (sites, bounds) = if transpose {
            (input.transposed().snap_rows(tol), rect.transposed())
        } else {
            (input.snap_rows(tol), rect)
        };

        let Swept { mut graph, active } = sweep(&sites, tol)?;
        clip(&mut graph, &sites, &bounds, tol)?;
        options
            .border
            .finalizer()
            .finalize(&mut graph, &sites, &active, &bounds, tol);
        if transpose {
            graph.transpose();
        }

        let cells = cells::extract(&graph, sites.len(), tol)?;
        let edges: Vec<Edge> = graph
            .live_edges()
            .filter_map(|e| {
                let (start, end) = graph.endpoints(e)?;
                Some(Edge {
                    start,
                    end,
                    faces: graph.faces(e),
                })
            })
            .collect();
        debug!(sites = sites.len(), edges = edges.len(), ?options, "built diagram");

        Ok(Diagram {
            rect,
            sites: input.points().to_vec(),
            active,
            cells,
            edges,
        })
    }

    /// All the cells, in the same order as the input sites.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, site: SiteIdx) -> &Cell {
        &self.cells[site.0]
    }

    pub fn neighbors(&self, site: SiteIdx) -> &[SiteIdx] {
        self.cells[site.0].neighbors()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn sites(&self) -> &[Point] {
        &self.sites
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Did this site take part in the diagram?
    ///
    /// Returns `false` for sites that coincide with an earlier site.
    pub fn is_active(&self, site: SiteIdx) -> bool {
        self.active[site.0]
    }

    /// The active site closest to `p`, preferring lower indices when several are
    /// equally close (up to the tolerance).
    ///
    /// Returns `None` if there are no sites.
    pub fn nearest_site(&self, p: Point) -> Option<SiteIdx> {
        let tol = Tolerance::DEFAULT;
        let mut best: Option<(SiteIdx, f64)> = None;
        for (i, q) in self.sites.iter().enumerate() {
            if !self.active[i] {
                continue;
            }
            let d = q.dist_sq(&p).sqrt();
            if best.map_or(true, |(_, best_d)| !tol.le(best_d, d)) {
                best = Some((SiteIdx(i), d));
            }
        }
        best.map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perturbation::{recipe, Recipe};
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn square() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 1000.0)
    }

    #[test]
    fn bad_input() {
        let opts = Options::default();
        assert_matches!(
            Diagram::build([(0.0, 0.0)], Rect::new(0.0, 0.0, 0.0, 1.0), opts),
            Err(Error::EmptyBounds)
        );
        assert_matches!(
            Diagram::build([(0.0, 0.0)], Rect::new(0.0, 0.0, f64::NAN, 1.0), opts),
            Err(Error::NonFiniteBounds)
        );
        assert_matches!(
            Diagram::build([(0.0, 0.0), (f64::INFINITY, 1.0)], square(), opts),
            Err(Error::NonFiniteSite { index: 1 })
        );
    }

    #[test]
    fn options_from_config() {
        let opts: Options = ron::from_str("(border: closed)").unwrap();
        assert_eq!(
            opts,
            Options {
                border: BorderMode::Closed,
                axis: SweepAxis::Vertical,
            }
        );
        let opts: Options = ron::from_str("(axis: horizontal)").unwrap();
        assert_eq!(opts.axis, SweepAxis::Horizontal);
        assert_eq!(opts.border, BorderMode::Open);
    }

    #[test]
    fn edges() {
        let d = Diagram::build([(500.0, 700.0), (500.0, 300.0)], square(), Options::default())
            .unwrap();
        assert_eq!(d.edges().len(), 1);
        let e = d.edges()[0];
        assert!(!e.is_border());
        assert_eq!(e.length(), 1000.0);

        let closed = Options {
            border: BorderMode::Closed,
            ..Options::default()
        };
        let d = Diagram::build([(500.0, 700.0), (500.0, 300.0)], square(), closed).unwrap();
        assert_eq!(d.edges().iter().filter(|e| e.is_border()).count(), 6);
        let perimeter: f64 = d
            .edges()
            .iter()
            .filter(|e| e.is_border())
            .map(Edge::length)
            .sum();
        assert_eq!(perimeter, 4000.0);
    }

    #[test]
    fn nearest_site() {
        let d = Diagram::build(
            [(100.0, 100.0), (100.0, 100.0), (900.0, 900.0), (900.0, 100.0)],
            square(),
            Options::default(),
        )
        .unwrap();
        assert!(!d.is_active(SiteIdx(1)));
        assert_eq!(d.nearest_site(Point::new(0.0, 0.0)), Some(SiteIdx(0)));
        assert_eq!(d.nearest_site(Point::new(1000.0, 0.0)), Some(SiteIdx(3)));
        // Equidistant from sites 2 and 3.
        assert_eq!(d.nearest_site(Point::new(900.0, 500.0)), Some(SiteIdx(2)));

        let empty = Diagram::build(Vec::<Point>::new(), square(), Options::default()).unwrap();
        assert_eq!(empty.nearest_site(Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn horizontal() {
        let sites = [(500.0, 700.0), (500.0, 300.0), (100.0, 100.0), (900.0, 200.0)];
        let vertical = Diagram::build(sites, square(), Options::default()).unwrap();
        let horizontal = Diagram::build(
            sites,
            square(),
            Options {
                axis: SweepAxis::Horizontal,
                ..Options::default()
            },
        )
        .unwrap();
        let tol = Tolerance { eps: 1e-6 };
        for (a, b) in vertical.cells().iter().zip(horizontal.cells()) {
            assert_eq!(a.neighbors(), b.neighbors());
            assert_eq!(a.points().len(), b.points().len());
            for (p, q) in a.points().iter().zip(b.points()) {
                assert!(p.close_to(q, tol), "{p:?} vs {q:?}");
            }
        }
    }

    fn check_diagram(sites: &[Point], rect: Rect) {
        for border in [BorderMode::Open, BorderMode::Closed] {
            let options = Options {
                border,
                ..Options::default()
            };
            let d = Diagram::build(sites.iter().copied(), rect, options).unwrap();
            for (i, cell) in d.cells().iter().enumerate() {
                let s = SiteIdx(i);
                assert!(!cell.neighbors().contains(&s));
                for &n in cell.neighbors() {
                    assert!(d.neighbors(n).contains(&s), "{s:?} -> {n:?}");
                }
                if !d.is_active(s) {
                    assert!(cell.is_empty());
                }
            }

            if border == BorderMode::Closed {
                let area: f64 = d.cells().iter().map(Cell::area).sum();
                assert!((area - rect.area()).abs() <= 1e-3 * rect.area(), "{area}");
            }
        }
    }

    fn check_recipes(recipes: Vec<Recipe>) {
        let base: Vec<Vec<Point>> = vec![
            vec![(400.0, 400.0), (600.0, 400.0), (400.0, 600.0), (600.0, 600.0)],
            [250.0, 500.0, 750.0]
                .into_iter()
                .flat_map(|x| [250.0, 500.0, 750.0].map(|y| (x, y)))
                .collect(),
            (1..=5).map(|i| (i as f64 * 100.0, 500.0)).collect(),
            (1..=5).map(|i| (500.0, i as f64 * 100.0)).collect(),
            (1..=5).map(|i| (i as f64 * 100.0, i as f64 * 100.0)).collect(),
            vec![
                (0.0, 0.0),
                (1000.0, 0.0),
                (1000.0, 1000.0),
                (0.0, 1000.0),
                (500.0, 0.0),
                (0.0, 500.0),
            ],
            vec![(500.0, 700.0), (500.0, 300.0)],
        ]
        .into_iter()
        .map(|ps| ps.into_iter().map(Point::from).collect())
        .collect();

        let sites: Vec<Point> = recipes.iter().flat_map(|r| r.sites(&base)).collect();
        check_diagram(&sites, square());
    }

    proptest! {
    #[test]
    fn perturbed_layouts(recipes in prop::collection::vec(recipe(0.5), 1..5)) {
        check_recipes(recipes);
    }
    }
}
