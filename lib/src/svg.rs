use anyhow::Result;

use crate::lloyd::CellCollector;
use crate::point::Point;
use std::path;
use svg::node::element::path::Data;
use svg::node::element::Circle;
use svg::node::element::Path;
use svg::Document;

const BOUNDARY_COLOR: &str = "black";
const CELL_COLOR: &str = "green";
const COLLAPSED_COLOR: &str = "magenta";
const POINT_COLOR: &str = "red";

fn draw_ring(document: Document, ring: &[Point], color: &str) -> Document {
    if ring.is_empty() {
        return document;
    }

    let mut data = Data::new().move_to((ring[0].x, ring[0].y));

    for point in ring.iter().skip(1) {
        data = data.line_to((point.x, point.y));
    }

    let path = Path::new()
        .set("fill", "none")
        .set("stroke", color)
        .set("stroke-width", "1.0")
        .set("d", data.close());

    document.add(path)
}

fn draw_points(document: Document, points: &[Point], color: &str) -> Document {
    let mut document = document;

    for point in points {
        document = document.add(
            Circle::new()
                .set("fill", color)
                .set("cx", point.x)
                .set("cy", point.y)
                .set("r", 1.0),
        );
    }

    document
}

/// Writes the boundary and the point set.
pub fn write_points(
    filename: &path::Path,
    boundary: &[Point],
    points: &[Point],
    width: u32,
    height: u32,
) -> Result<()> {
    let mut document = Document::new().set("viewBox", (0, 0, width, height));

    document = draw_ring(document, boundary, BOUNDARY_COLOR);
    document = draw_points(document, points, POINT_COLOR);

    svg::save(filename, &document)?;

    Ok(())
}

/// Writes one relaxation iteration: boundary, raw Voronoi cells, collapsed
/// cells, and the adjusted points.
pub fn write_iteration(
    filename: &path::Path,
    boundary: &[Point],
    points: &[Point],
    cells: &CellCollector,
    width: u32,
    height: u32,
) -> Result<()> {
    let mut document = Document::new().set("viewBox", (0, 0, width, height));

    for cell in &cells.cells {
        document = draw_ring(document, cell, CELL_COLOR);
    }

    for cell in &cells.collapsed {
        document = draw_ring(document, cell, COLLAPSED_COLOR);
    }

    document = draw_ring(document, boundary, BOUNDARY_COLOR);
    document = draw_points(document, points, POINT_COLOR);

    svg::save(filename, &document)?;

    Ok(())
}
