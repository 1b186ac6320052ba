//! Site sets built by disturbing degenerate layouts, for property testing.

use proptest::{arbitrary::any, prop_oneof, strategy::Strategy};

use crate::geom::Point;

/// A small change to one coordinate.
#[derive(Clone, Copy, Debug)]
pub enum Jitter {
    /// Step this many representable values up, or down if negative.
    Ulps(i8),
    Shift(f64),
}

impl Jitter {
    fn apply(self, x: f64) -> f64 {
        match self {
            Jitter::Ulps(n) => (0..n.unsigned_abs()).fold(x, |x, _| {
                if n > 0 {
                    next_up(x)
                } else {
                    -next_up(-x)
                }
            }),
            Jitter::Shift(d) => x + d,
        }
    }

    fn strategy(max_shift: f64) -> impl Strategy<Value = Jitter> {
        prop_oneof![
            any::<i8>().prop_map(Jitter::Ulps),
            (-max_shift..=max_shift).prop_map(Jitter::Shift),
        ]
    }
}

// For finite `x`.
fn next_up(x: f64) -> f64 {
    match x {
        x if x == 0.0 => f64::from_bits(1),
        x if x > 0.0 => f64::from_bits(x.to_bits() + 1),
        x => f64::from_bits(x.to_bits() - 1),
    }
}

/// How to cook up a site set from a list of base layouts.
///
/// Indices wrap around, so any `usize` picks something valid.
#[derive(Clone, Debug)]
pub enum Recipe {
    Layout(usize),
    /// Jitters one site of the inner set.
    Jitter {
        site: usize,
        dx: Jitter,
        dy: Jitter,
        inner: Box<Recipe>,
    },
    /// Inserts a new site at `t` along the way from one site of the inner set to the next.
    Between {
        site: usize,
        t: f64,
        inner: Box<Recipe>,
    },
    /// Both sets, one after the other.
    Overlay(Box<Recipe>, Box<Recipe>),
}

impl Recipe {
    /// The layouts must all be non-empty.
    pub fn sites(&self, layouts: &[Vec<Point>]) -> Vec<Point> {
        match self {
            Recipe::Layout(i) => layouts[i % layouts.len()].clone(),
            Recipe::Jitter {
                site,
                dx,
                dy,
                inner,
            } => {
                let mut ps = inner.sites(layouts);
                let n = ps.len();
                let p = &mut ps[site % n];
                *p = Point::new(dx.apply(p.x), dy.apply(p.y));
                ps
            }
            Recipe::Between { site, t, inner } => {
                let mut ps = inner.sites(layouts);
                let i = site % ps.len();
                let (a, b) = (ps[i], ps[(i + 1) % ps.len()]);
                ps.insert(i + 1, a.along(b - a, *t));
                ps
            }
            Recipe::Overlay(first, second) => {
                let mut ps = first.sites(layouts);
                ps.extend(second.sites(layouts));
                ps
            }
        }
    }
}

/// Recipes nested up to three deep, with shifts of at most `max_shift`.
pub fn recipe(max_shift: f64) -> impl Strategy<Value = Recipe> {
    any::<usize>()
        .prop_map(Recipe::Layout)
        .prop_recursive(3, 16, 8, move |inner| {
            let inner = inner.prop_map(Box::new);
            let jitter = || Jitter::strategy(max_shift);
            prop_oneof![
                (any::<usize>(), jitter(), jitter(), inner.clone()).prop_map(
                    |(site, dx, dy, inner)| Recipe::Jitter {
                        site,
                        dx,
                        dy,
                        inner
                    }
                ),
                (any::<usize>(), 0.0..1.0, inner.clone())
                    .prop_map(|(site, t, inner)| Recipe::Between { site, t, inner }),
                (inner.clone(), inner).prop_map(|(a, b)| Recipe::Overlay(a, b)),
            ]
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ulps() {
        assert_eq!(Jitter::Ulps(1).apply(1.0), next_up(1.0));
        assert_eq!(Jitter::Ulps(-1).apply(next_up(1.0)), 1.0);
        assert_eq!(Jitter::Ulps(2).apply(-0.0), f64::from_bits(2));
        assert!(Jitter::Ulps(-3).apply(0.0) < 0.0);
    }

    #[test]
    fn cook() {
        let layouts = vec![vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0)]];
        let recipe = Recipe::Overlay(
            Box::new(Recipe::Layout(7)),
            Box::new(Recipe::Between {
                site: 0,
                t: 0.5,
                inner: Box::new(Recipe::Layout(0)),
            }),
        );
        assert_eq!(
            recipe.sites(&layouts),
            vec![
                Point::new(0.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
            ]
        );
    }
}
