use crate::{
    diagram::{BorderMode, Diagram, Options},
    geom::{Point, Rect},
    Error,
};

/// Performs Lloyd relaxation on sites in a rectangle.
///
/// Each iteration moves every site to the centroid of its (closed) cell, which
/// makes the cells more uniform in size and shape. Sites that coincide with an
/// earlier site have no cell, and stay where they are.
pub fn relax(sites: &mut [Point], rect: Rect, iterations: usize) -> Result<(), Error> {
    let options = Options {
        border: BorderMode::Closed,
        ..Options::default()
    };
    for _ in 0..iterations {
        let diagram = Diagram::build(sites.iter().copied(), rect, options)?;
        for (site, cell) in sites.iter_mut().zip(diagram.cells()) {
            if let Some(c) = cell.centroid() {
                *site = rect.clamp(c);
            }
        }
    }
    Ok(())
}
