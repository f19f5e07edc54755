use crate::point::Point;
use log::debug;
use rand::Rng;
use std::collections::HashSet;

/// Checks whether any coordinate value occurs more than once.
///
/// The check runs over the flattened coordinate values, not point pairs:
/// tessellating coincident sites collapses the number of Voronoi regions
/// below the number of input points, and a shared scalar between two sites
/// is close enough to that situation to jitter away as well.
fn contains_duplicates(points: &[Point]) -> bool {
    let mut seen = HashSet::with_capacity(points.len() * 2);

    points
        .iter()
        .flat_map(|p| [p.x, p.y])
        .any(|value| !seen.insert(value.to_bits()))
}

/// Jitters points until all coordinate values are unique.
///
/// Already-unique input is returned unchanged. Each retry offsets every
/// coordinate by an independent draw from `(-jitter, jitter)`; with a
/// continuous source one pass almost surely suffices.
pub fn deduplicate<R: Rng>(mut points: Vec<Point>, jitter: f64, rng: &mut R) -> Vec<Point> {
    while contains_duplicates(&points) {
        debug!("duplicate coordinate values found, jittering {} points", points.len());

        points = points
            .into_iter()
            .map(|p| p + Point::new(rng.gen_range(-jitter..jitter), rng.gen_range(-jitter..jitter)))
            .collect();
    }

    points
}
