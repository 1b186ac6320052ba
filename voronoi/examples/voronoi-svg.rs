use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use voronoi::{BorderMode, Diagram, Options, Point, Rect};

#[derive(Parser)]
struct Args {
    /// A text file with one site per line, given as two whitespace-separated numbers.
    input: PathBuf,
    output: PathBuf,

    /// A RON file with the diagram options, like `(border: closed, axis: horizontal)`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Close off the cells along the bounding rectangle.
    #[arg(long)]
    closed: bool,

    /// Run this many steps of Lloyd relaxation before drawing.
    #[arg(long, default_value_t = 0)]
    lloyd: usize,

    /// The bounding rectangle, as `min_x,min_y,max_x,max_y`. Defaults to the
    /// bounding box of the sites, with some padding.
    #[arg(long)]
    bounds: Option<String>,
}

fn read_sites(input: &str) -> anyhow::Result<Vec<Point>> {
    let mut ret = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let coords = line
            .split_whitespace()
            .map(|s| s.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("line {}", line_no + 1))?;
        let [x, y] = coords[..] else {
            bail!("line {}: expected two coordinates", line_no + 1);
        };
        ret.push(Point::new(x, y));
    }
    Ok(ret)
}

fn parse_bounds(s: &str) -> anyhow::Result<Rect> {
    let coords = s
        .split(',')
        .map(|c| c.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()?;
    let [min_x, min_y, max_x, max_y] = coords[..] else {
        bail!("expected four comma-separated bounds, got {s:?}");
    };
    Ok(Rect::new(min_x, min_y, max_x, max_y))
}

fn bounding_box(sites: &[Point]) -> anyhow::Result<Rect> {
    let min_x = sites.iter().map(|p| p.x).reduce(f64::min);
    let max_x = sites.iter().map(|p| p.x).reduce(f64::max);
    let min_y = sites.iter().map(|p| p.y).reduce(f64::min);
    let max_y = sites.iter().map(|p| p.y).reduce(f64::max);
    let (Some(min_x), Some(max_x), Some(min_y), Some(max_y)) = (min_x, max_x, min_y, max_y) else {
        return Err(anyhow!("no sites, and no bounds given"));
    };
    let pad = 1.0 + 0.05 * (max_x - min_x).max(max_y - min_y);
    Ok(Rect::new(min_x - pad, min_y - pad, max_x + pad, max_y + pad))
}

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let mut options = match &args.config {
        Some(path) => {
            let config = std::fs::read_to_string(path)?;
            ron::from_str::<Options>(&config).with_context(|| format!("{}", path.display()))?
        }
        None => Options::default(),
    };
    if args.closed {
        options.border = BorderMode::Closed;
    }

    let input = std::fs::read_to_string(&args.input)?;
    let mut sites = read_sites(&input)?;
    let rect = match &args.bounds {
        Some(b) => parse_bounds(b)?,
        None => bounding_box(&sites)?,
    };
    voronoi::lloyd::relax(&mut sites, rect, args.lloyd)?;
    let diagram = Diagram::build(sites.iter().copied(), rect, options)?;

    let size = rect.width().max(rect.height());
    let stroke_width = size / 1024.0;
    let dot_radius = stroke_width * 2.0;
    let pad = stroke_width * 4.0;
    let mut document = svg::Document::new().set(
        "viewBox",
        (
            rect.min.x - pad,
            rect.min.y - pad,
            rect.width() + 2.0 * pad,
            rect.height() + 2.0 * pad,
        ),
    );

    for cell in diagram.cells() {
        let mut points = cell.points().iter();
        let Some(p) = points.next() else {
            continue;
        };
        let mut data = svg::node::element::path::Data::new().move_to((p.x, p.y));
        for p in points {
            data = data.line_to((p.x, p.y));
        }
        if options.border == BorderMode::Closed {
            data = data.close();
        }
        let path = svg::node::element::Path::new()
            .set("d", data)
            .set("stroke", "black")
            .set("stroke-width", stroke_width)
            .set("fill", "none");
        document = document.add(path);
    }

    for edge in diagram.edges().iter().filter(|e| !e.is_border()) {
        let line = svg::node::element::Line::new()
            .set("x1", edge.start.x)
            .set("y1", edge.start.y)
            .set("x2", edge.end.x)
            .set("y2", edge.end.y)
            .set("stroke", "blue")
            .set("stroke-width", stroke_width);
        document = document.add(line);
    }

    for (i, p) in diagram.sites().iter().enumerate() {
        let color = if diagram.is_active(voronoi::SiteIdx(i)) {
            "red"
        } else {
            "gray"
        };
        let circle = svg::node::element::Circle::new()
            .set("cx", p.x)
            .set("cy", p.y)
            .set("r", dot_radius)
            .set("fill", color);
        document = document.add(circle);
    }

    svg::save(&args.output, &document)?;

    Ok(())
}
