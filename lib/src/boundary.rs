use crate::point::Point;
use image::GenericImageView;
use std::collections::HashSet;

/// Clockwise 8-neighborhood starting west, with y growing downward.
const NEIGHBORS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

/// Collects pixel coordinates whose red channel exceeds `threshold`.
pub fn foreground_pixels(img: &image::DynamicImage, threshold: u8) -> Vec<(i32, i32)> {
    let (width, height) = img.dimensions();
    let mut pixels = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if img.get_pixel(x, y)[0] > threshold {
                pixels.push((x as i32, y as i32));
            }
        }
    }

    pixels
}

/// Traces the outer contour of a pixel region with Moore-neighbor tracing.
///
/// Returns the ordered boundary polygon, starting at the topmost-leftmost
/// pixel and running clockwise. The ring is left open; consumers close it.
/// Thin sections may appear twice in the ring, once per side.
pub fn trace_boundary(pixels: &[(i32, i32)]) -> Vec<Point> {
    let region: HashSet<(i32, i32)> = pixels.iter().copied().collect();

    let start = match pixels.iter().min_by_key(|&&(x, y)| (y, x)) {
        Some(&p) => p,
        None => return Vec::new(),
    };

    let mut contour = vec![start];
    let mut current = start;
    // The west neighbor of the topmost-leftmost pixel is background, which
    // anchors the clockwise scan.
    let mut backtrack = (start.0 - 1, start.1);

    for _ in 0..8 * region.len() {
        let offset = (backtrack.0 - current.0, backtrack.1 - current.1);
        let mut dir = NEIGHBORS
            .iter()
            .position(|&d| d == offset)
            .unwrap_or_default();

        let mut next = None;

        for _ in 0..8 {
            dir = (dir + 1) % 8;
            let candidate = (current.0 + NEIGHBORS[dir].0, current.1 + NEIGHBORS[dir].1);

            if region.contains(&candidate) {
                next = Some(candidate);
                break;
            }

            backtrack = candidate;
        }

        match next {
            // isolated pixel
            None => break,
            Some(next) => {
                if next == start {
                    break;
                }

                contour.push(next);
                current = next;
            }
        }
    }

    contour
        .into_iter()
        .map(|(x, y)| Point::new(x as f64, y as f64))
        .collect()
}
