//! Voronoi diagrams of points in the plane, clipped to a rectangle.
//!
//! ```
//! use voronoi::{Diagram, Options, Rect, SiteIdx};
//!
//! let rect = Rect::new(0.0, 0.0, 1000.0, 1000.0);
//! let diagram = Diagram::build([(500.0, 700.0), (500.0, 300.0)], rect, Options::default())?;
//! assert_eq!(diagram.neighbors(SiteIdx(0)), &[SiteIdx(1)]);
//! assert_eq!(diagram.cell(SiteIdx(0)).points().len(), 2);
//! # Ok::<(), voronoi::Error>(())
//! ```

mod beach_line;
mod border;
mod cells;
mod clip;
mod diagram;
mod error;
mod events;
mod geom;
mod graph;
pub mod lloyd;
mod num;
mod sites;
mod sweep;

pub use cells::Cell;
pub use diagram::{BorderMode, Diagram, Edge, Options, SweepAxis};
pub use error::Error;
pub use geom::{Point, Rect};
pub use graph::Face;
pub use num::Tolerance;
pub use sites::SiteIdx;

#[cfg(test)]
pub mod perturbation;
