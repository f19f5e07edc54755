pub mod boundary;
pub mod dedup;
pub mod lloyd;
pub mod point;
#[cfg(feature = "svg")]
pub mod svg;

use geo::{BoundingRect, Contains};
use point::Point;
use rand::Rng;

/// Samples `count` points uniformly inside the boundary polygon.
///
/// Rejection sampling against the polygon's bounding box. The boundary must
/// enclose some area, otherwise no sample is ever accepted; an empty or
/// degenerate boundary returns no points instead of looping.
pub fn sample_points<R: Rng>(boundary: &[Point], count: usize, rng: &mut R) -> Vec<Point> {
    let region = lloyd::region_polygon(boundary);

    let bounds = match region.bounding_rect() {
        Some(bounds) if bounds.width() > 0.0 && bounds.height() > 0.0 => bounds,
        _ => return Vec::new(),
    };

    let mut points = Vec::with_capacity(count);

    while points.len() < count {
        let x = rng.gen_range(bounds.min().x..bounds.max().x);
        let y = rng.gen_range(bounds.min().y..bounds.max().y);

        if region.contains(&geo::Point::new(x, y)) {
            points.push(Point::new(x, y));
        }
    }

    points
}
