//! Error types for diagram construction.

use std::fmt;

/// Errors that can occur while building a diagram.
///
/// Degenerate but finite input (duplicate sites, collinear sites, sites on
/// the boundary) is never an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The site with this input index had a NaN or infinite coordinate.
    NonFiniteSite {
        /// Position of the offending site in the input.
        index: usize,
    },

    /// One of the rectangle bounds was NaN or infinite.
    NonFiniteBounds,

    /// The rectangle has zero or negative extent along some axis.
    EmptyBounds,

    /// An internal consistency check failed.
    ///
    /// This should not happen with valid input and indicates a bug.
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NonFiniteSite { index } => {
                write!(f, "site {} has a non-finite coordinate", index)
            }
            Error::NonFiniteBounds => write!(f, "bounding rectangle is not finite"),
            Error::EmptyBounds => write!(f, "bounding rectangle is empty"),
            Error::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
