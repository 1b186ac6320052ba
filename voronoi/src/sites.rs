use serde::Serialize;

use crate::{
    geom::Point,
    num::{key, Tolerance},
    Error,
};

/// An index into our site arena.
///
/// Sites are identified by their position in the input, so two sites with the
/// same coordinates are still different sites.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Serialize)]
pub struct SiteIdx(pub usize);

impl std::fmt::Debug for SiteIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s_{}", self.0)
    }
}

/// The input sites, validated to be finite.
#[derive(Clone, Debug, Default)]
pub struct Sites {
    points: Vec<Point>,
}

impl Sites {
    pub fn new<P: Into<Point>>(ps: impl IntoIterator<Item = P>) -> Result<Self, Error> {
        let points: Vec<Point> = ps.into_iter().map(|p| p.into()).collect();
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(Error::NonFiniteSite { index });
        }
        Ok(Sites { points })
    }

    pub fn get(&self, idx: SiteIdx) -> Point {
        self.points[idx.0]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn indices(&self) -> impl Iterator<Item = SiteIdx> {
        (0..self.points.len()).map(SiteIdx)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// All site indices, sorted by `y`, then `x`, then index.
    pub fn sweep_order(&self) -> Vec<SiteIdx> {
        let mut order: Vec<_> = self.indices().collect();
        order.sort_by_key(|&idx| {
            let p = self.get(idx);
            // The coordinates were checked to be finite on construction.
            (key(p.y), key(p.x), idx)
        });
        order
    }

    pub fn transposed(&self) -> Sites {
        Sites {
            points: self.points.iter().map(Point::transposed).collect(),
        }
    }

    /// Snaps sites that are within the tolerance of the same horizontal line onto that line.
    ///
    /// Sites whose sweep coordinates differ by less than the tolerance would otherwise have
    /// arcs too thin for the breakpoint computation to resolve. After snapping, two sites either
    /// share a `y` coordinate exactly or are separated by more than the tolerance.
    pub fn snap_rows(&self, tol: Tolerance) -> Sites {
        let mut points = self.points.clone();
        let mut row: Option<f64> = None;
        for idx in self.sweep_order() {
            let y = self.get(idx).y;
            let row_y = match row {
                Some(row_y) if y - row_y <= tol.eps => row_y,
                _ => y,
            };
            row = Some(row_y);
            points[idx.0].y = row_y;
        }
        Sites { points }
    }
}

impl std::ops::Index<SiteIdx> for Sites {
    type Output = Point;

    fn index(&self, idx: SiteIdx) -> &Point {
        &self.points[idx.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite() {
        assert_eq!(
            Sites::new([(0.0, 0.0), (1.0, f64::INFINITY)]).unwrap_err(),
            Error::NonFiniteSite { index: 1 }
        );
        assert_eq!(
            Sites::new([(f64::NAN, 0.0)]).unwrap_err(),
            Error::NonFiniteSite { index: 0 }
        );
    }

    #[test]
    fn sweep_order() {
        let sites = Sites::new([(1.0, 1.0), (0.0, 1.0), (5.0, 0.0), (0.0, 1.0)]).unwrap();
        assert_eq!(
            sites.sweep_order(),
            vec![SiteIdx(2), SiteIdx(1), SiteIdx(3), SiteIdx(0)]
        );
    }

    #[test]
    fn snap_rows() {
        let sites = Sites::new([
            (0.0, 1.0 + 4e-10),
            (2.0, 1.0),
            (3.0, 1.0 + 8e-10),
            (4.0, 1.0 + 2e-9),
            (5.0, 7.0),
        ])
        .unwrap();
        let snapped = sites.snap_rows(Tolerance::DEFAULT);
        let ys: Vec<_> = snapped.points().iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![1.0, 1.0, 1.0, 1.0 + 2e-9, 7.0]);
        assert_eq!(snapped[SiteIdx(0)].x, 0.0);
    }
}
