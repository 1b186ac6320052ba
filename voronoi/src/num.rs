//! Tolerance-aware comparisons for the floating-point geometry.

use ordered_float::NotNan;

/// The key type we use wherever floats need a total order (event queues, sorting).
pub type Float = NotNan<f64>;

/// An absolute tolerance for coordinate comparisons.
///
/// Two coordinates are considered equal if they differ by at most `eps`. Since the
/// tolerance is absolute, inputs are expected to have moderate magnitude; callers
/// needing a different precision should scale their input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    pub const DEFAULT: Tolerance = Tolerance { eps: 1e-9 };

    /// Are `a` and `b` equal up to our tolerance?
    pub fn eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.eps
    }

    /// Is `a` at most `b`, up to our tolerance?
    pub fn le(&self, a: f64, b: f64) -> bool {
        a <= b + self.eps
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Converts a float that is known to be finite into a sort key.
///
/// Returns `None` for NaN, which callers treat as "no such event".
pub(crate) fn key(x: f64) -> Option<Float> {
    NotNan::new(x).ok()
}
