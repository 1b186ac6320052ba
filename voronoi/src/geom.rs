use robust::Coord;
use serde::{Deserialize, Serialize};

use crate::{num::Tolerance, Error};

/// A point in the plane.
///
/// The sweep moves in the direction of increasing `y`.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    pub fn dist_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Reflects this point across the diagonal `x == y`.
    pub fn transposed(&self) -> Point {
        Point {
            x: self.y,
            y: self.x,
        }
    }

    /// Are the two points equal (coordinate-wise) up to the tolerance?
    pub fn close_to(&self, other: &Point, tol: Tolerance) -> bool {
        tol.eq(self.x, other.x) && tol.eq(self.y, other.y)
    }

    /// The point `self + t * dir`.
    pub fn along(&self, dir: Vector, t: f64) -> Point {
        Point {
            x: self.x + t * dir.x,
            y: self.y + t * dir.y,
        }
    }

    fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub fn dot(&self, other: &Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn cross(&self, other: &Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn norm_sq(&self) -> f64 {
        self.dot(self)
    }
}

/// The orientation of the triangle `a`, `b`, `c`.
///
/// Positive if the points are in counter-clockwise order, negative if clockwise,
/// and zero if they are collinear. The sign is always exact.
pub fn orient(a: Point, b: Point, c: Point) -> f64 {
    robust::orient2d(a.coord(), b.coord(), c.coord())
}

/// Positive if `d` is strictly inside the circle through `a`, `b`, `c` (which must be
/// in counter-clockwise order), negative if it is strictly outside, and zero if the
/// four points are cocircular. The sign is always exact.
pub fn incircle(a: Point, b: Point, c: Point, d: Point) -> f64 {
    robust::incircle(a.coord(), b.coord(), c.coord(), d.coord())
}

/// A circle through three sites.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    /// The circle passing through `a`, `b`, and `c`.
    ///
    /// Returns `None` if the points are (numerically) collinear.
    pub fn through(a: Point, b: Point, c: Point) -> Option<Circle> {
        // Relative to the vertex opposite the longest side, with the determinant from
        // the exact predicate.
        let (ab, bc, ca) = (a.dist_sq(&b), b.dist_sq(&c), c.dist_sq(&a));
        let (p, u, v) = if ab >= bc && ab >= ca {
            (c, a, b)
        } else if bc >= ca {
            (a, b, c)
        } else {
            (b, c, a)
        };
        let du = u - p;
        let dv = v - p;
        let d = 2.0 * orient(p, u, v);
        let hu = du.norm_sq();
        let hv = dv.norm_sq();
        let x = (dv.y * hu - du.y * hv) / d;
        let y = (du.x * hv - dv.x * hu) / d;
        let ret = Circle {
            center: Point::new(p.x + x, p.y + y),
            radius: x.hypot(y),
        };
        (ret.center.is_finite() && ret.radius.is_finite()).then_some(ret)
    }

    /// The sweep position at which the circle is completely swept over.
    pub fn bottom(&self) -> f64 {
        self.center.y + self.radius
    }
}

/// The `x` coordinate of the breakpoint between the arc of `left` and the arc of
/// `right` when the sweep line is at `directrix`.
///
/// Both sites are at or behind the sweep line. A site exactly on the sweep line has
/// a degenerate (vertical) arc, and the breakpoint is at its `x` coordinate.
pub fn breakpoint(left: Point, right: Point, directrix: f64) -> f64 {
    let pby2 = right.y - directrix;
    if pby2 == 0.0 {
        return right.x;
    }
    let plby2 = left.y - directrix;
    if plby2 == 0.0 {
        return left.x;
    }

    // A root of a quadratic in `x - right.x`. Both coefficients go through `dy` rather
    // than a difference of reciprocals, and the root is taken in the non-cancelling form.
    let hl = left.x - right.x;
    let dy = left.y - right.y;
    let aby2 = dy / (pby2 * plby2);
    let b = hl / plby2;
    if aby2 != 0.0 {
        let c = hl * hl / (-2.0 * plby2) - dy / 2.0;
        let sq = (b * b - 2.0 * aby2 * c).max(0.0).sqrt();
        let x = if b > 0.0 {
            -2.0 * c / (b + sq)
        } else {
            (-b + sq) / aby2
        };
        x + right.x
    } else {
        // Both sites are at the same height, so the breakpoint is halfway between them.
        (right.x + left.x) / 2.0
    }
}

/// One of the four sides of a [`Rect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Bottom,
    Top,
}

/// An axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Rect {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// The four corners, counter-clockwise starting from `min`.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }

    pub fn transposed(&self) -> Rect {
        Rect {
            min: self.min.transposed(),
            max: self.max.transposed(),
        }
    }

    /// Checks that the bounds are finite and that the rectangle is non-empty.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(Error::NonFiniteBounds);
        }
        if self.min.x >= self.max.x || self.min.y >= self.max.y {
            return Err(Error::EmptyBounds);
        }
        Ok(())
    }

    pub fn clamp(&self, p: Point) -> Point {
        Point {
            x: p.x.clamp(self.min.x, self.max.x),
            y: p.y.clamp(self.min.y, self.max.y),
        }
    }

    pub fn contains(&self, p: Point, tol: Tolerance) -> bool {
        tol.le(self.min.x, p.x)
            && tol.le(p.x, self.max.x)
            && tol.le(self.min.y, p.y)
            && tol.le(p.y, self.max.y)
    }

    /// Moves `p` exactly onto `side`, and then into the rectangle.
    pub fn snap(&self, p: Point, side: Side) -> Point {
        let p = match side {
            Side::Left => Point::new(self.min.x, p.y),
            Side::Right => Point::new(self.max.x, p.y),
            Side::Bottom => Point::new(p.x, self.min.y),
            Side::Top => Point::new(p.x, self.max.y),
        };
        self.clamp(p)
    }

    /// If `p` is on the boundary, returns its distance along the boundary, walking
    /// counter-clockwise from `min`.
    pub fn perimeter_position(&self, p: Point, tol: Tolerance) -> Option<f64> {
        let w = self.width();
        let h = self.height();
        if tol.eq(p.y, self.min.y) {
            Some(p.x - self.min.x)
        } else if tol.eq(p.x, self.max.x) {
            Some(w + p.y - self.min.y)
        } else if tol.eq(p.y, self.max.y) {
            Some(w + h + self.max.x - p.x)
        } else if tol.eq(p.x, self.min.x) {
            Some(2.0 * w + h + self.max.y - p.y)
        } else {
            None
        }
    }
}
