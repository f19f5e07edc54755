use crate::dedup;
use crate::point::Point;
use anyhow::{anyhow, Result};
use geo::{BooleanOps, BoundingRect, Centroid, LineString, Polygon};
use log::warn;
use rand::Rng;
use voronator::delaunator;
use voronator::VoronoiDiagram;

/// Tuning constants for one relaxation step.
#[derive(Debug, Clone)]
pub struct RelaxParams {
    /// Magnitude of the random offset used to separate duplicate coordinates.
    pub jitter: f64,
    /// Offset applied to a point whose cell collapsed to an empty clip.
    pub fallback_offset: f64,
    /// Sentinel corners are placed this many boundary extents away from the
    /// boundary center.
    pub sentinel_scale: f64,
}

impl Default for RelaxParams {
    fn default() -> Self {
        RelaxParams {
            jitter: 1e-9,
            fallback_offset: 1e-6,
            sentinel_scale: 1000.0,
        }
    }
}

/// Per-cell geometry reported to an observer while relaxing.
///
/// Purely observational, the reported rings never feed back into the
/// computed positions.
#[derive(Debug)]
pub enum CellEvent<'a> {
    /// Closed vertex ring of the raw Voronoi cell, before clipping.
    Cell { index: usize, vertices: &'a [Point] },
    /// Ring of a cell whose intersection with the boundary collapsed.
    Collapsed { index: usize, vertices: &'a [Point] },
}

/// Record of a cell that had no usable intersection with the boundary.
#[derive(Debug, Clone)]
pub struct CollapsedCell {
    pub index: usize,
    pub position: Point,
}

/// Result of one relaxation step.
#[derive(Debug, Clone)]
pub struct Relaxed {
    /// New positions, index-aligned with the input points.
    pub points: Vec<Point>,
    /// Cells that fell back to a dithered copy of their input point.
    pub collapsed: Vec<CollapsedCell>,
}

/// Builds the closed boundary region. `Polygon::new` closes the ring if the
/// caller did not repeat the first vertex.
pub(crate) fn region_polygon(boundary: &[Point]) -> Polygon<f64> {
    let ring: LineString<f64> = boundary.iter().map(geo::Coord::from).collect();

    Polygon::new(ring, vec![])
}

/// Moves every point to the centroid of its boundary-clipped Voronoi cell.
///
/// One step of Lloyd's algorithm: the caller drives the iteration and decides
/// when to stop. The boundary must be a simple ring, open or closed; a
/// self-intersecting or zero-area boundary is out of contract and produces
/// unspecified clips.
pub fn relax<R: Rng>(points: Vec<Point>, boundary: &[Point], rng: &mut R) -> Result<Relaxed> {
    relax_with(points, boundary, &RelaxParams::default(), rng, |_| {})
}

/// Full form of [`relax`] with explicit parameters and a cell observer.
pub fn relax_with<R, F>(
    points: Vec<Point>,
    boundary: &[Point],
    params: &RelaxParams,
    rng: &mut R,
    mut observe: F,
) -> Result<Relaxed>
where
    R: Rng,
    F: FnMut(CellEvent),
{
    if points.is_empty() {
        return Ok(Relaxed {
            points,
            collapsed: Vec::new(),
        });
    }

    let region = region_polygon(boundary);
    let bounds = region
        .bounding_rect()
        .ok_or_else(|| anyhow!("boundary polygon has no extent"))?;

    // Coincident sites would collapse the number of Voronoi regions.
    let points = dedup::deduplicate(points, params.jitter, rng);

    // Corner sites far outside the region. Every real point then lies inside
    // the convex hull of the site set and gets a bounded cell.
    let center = bounds.center();
    let reach = params.sentinel_scale * bounds.width().max(bounds.height()).max(1.0);
    let sentinels = [
        (center.x - reach, center.y - reach),
        (center.x - reach, center.y + reach),
        (center.x + reach, center.y + reach),
        (center.x + reach, center.y - reach),
    ];

    let sites: Vec<delaunator::Point> = points
        .iter()
        .copied()
        .map(delaunator::Point::from)
        .chain(
            sentinels
                .iter()
                .map(|&(x, y)| delaunator::Point { x, y }),
        )
        .collect();

    // Clipping box for the diagram itself, wide enough to keep the sentinel
    // sites strictly inside.
    let min = delaunator::Point {
        x: center.x - 2.0 * reach,
        y: center.y - 2.0 * reach,
    };
    let max = delaunator::Point {
        x: center.x + 2.0 * reach,
        y: center.y + 2.0 * reach,
    };

    let diagram = VoronoiDiagram::new(&min, &max, &sites)
        .ok_or_else(|| anyhow!("Failed to generate Voronoi diagram"))?;

    let mut new_points = Vec::with_capacity(points.len());
    let mut collapsed = Vec::new();

    // Sentinel cells sit at the tail of the diagram and are skipped.
    for (index, cell) in diagram.cells().iter().take(points.len()).enumerate() {
        let mut ring: Vec<Point> = cell
            .points()
            .iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .map(Point::from)
            .collect();

        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }

        observe(CellEvent::Cell {
            index,
            vertices: &ring,
        });

        // A closed ring needs at least three distinct vertices.
        let centroid = if ring.len() > 3 {
            let cell_polygon = Polygon::new(ring.iter().map(geo::Coord::from).collect(), vec![]);
            region.intersection(&cell_polygon).centroid()
        } else {
            None
        };

        match centroid {
            Some(c) => new_points.push(Point::new(c.x(), c.y())),
            None => {
                warn!("cell {} has an empty boundary intersection, dithering its point", index);

                observe(CellEvent::Collapsed {
                    index,
                    vertices: &ring,
                });

                let position =
                    points[index] + Point::new(params.fallback_offset, params.fallback_offset);

                collapsed.push(CollapsedCell { index, position });
                new_points.push(position);
            }
        }
    }

    Ok(Relaxed {
        points: new_points,
        collapsed,
    })
}

/// Collects observed cell rings, e.g. for drawing one iteration.
#[derive(Debug, Default)]
pub struct CellCollector {
    pub cells: Vec<Vec<Point>>,
    pub collapsed: Vec<Vec<Point>>,
}

impl CellCollector {
    pub fn record(&mut self, event: CellEvent) {
        match event {
            CellEvent::Cell { vertices, .. } => self.cells.push(vertices.to_vec()),
            CellEvent::Collapsed { vertices, .. } => self.collapsed.push(vertices.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
        ]
    }

    #[test]
    fn single_point_moves_to_the_center_of_a_square() {
        let mut rng = StdRng::seed_from_u64(7);

        // The sole real cell covers the whole square, its centroid is the
        // center regardless of where the point starts out.
        let result = relax(vec![Point::new(2.0, 3.0)], &square(), &mut rng).unwrap();

        assert_eq!(result.points.len(), 1);
        assert!(result.collapsed.is_empty());
        assert_relative_eq!(result.points[0].x, 5.0, epsilon = 1e-6);
        assert_relative_eq!(result.points[0].y, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn symmetric_points_move_to_half_square_centroids() {
        let mut rng = StdRng::seed_from_u64(8);
        let points = vec![Point::new(3.0, 5.0), Point::new(7.0, 5.0)];

        let result = relax(points, &square(), &mut rng).unwrap();

        // The shared cell edge is x = 5, so the clipped cells are the two
        // half squares.
        assert_relative_eq!(result.points[0].x, 2.5, epsilon = 1e-3);
        assert_relative_eq!(result.points[0].y, 5.0, epsilon = 1e-3);
        assert_relative_eq!(result.points[1].x, 7.5, epsilon = 1e-3);
        assert_relative_eq!(result.points[1].y, 5.0, epsilon = 1e-3);
    }

    #[test]
    fn relaxation_preserves_the_point_count() {
        let mut rng = StdRng::seed_from_u64(9);
        let points: Vec<_> = (0..25)
            .map(|_| Point::new(rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)))
            .collect();

        let result = relax(points, &square(), &mut rng).unwrap();

        assert_eq!(result.points.len(), 25);
    }

    #[test]
    fn repeated_relaxation_does_not_diverge() {
        let mut rng = StdRng::seed_from_u64(10);
        let boundary = square();
        let mut points: Vec<_> = (0..10)
            .map(|_| Point::new(rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)))
            .collect();

        let mut displacements = Vec::new();

        for _ in 0..20 {
            let result = relax(points.clone(), &boundary, &mut rng).unwrap();

            let total: f64 = points
                .iter()
                .zip(&result.points)
                .map(|(a, b)| a.distance(b))
                .sum();

            displacements.push(total);
            points = result.points;
        }

        let early: f64 = displacements[..3].iter().sum();
        let late: f64 = displacements[17..].iter().sum();

        assert!(late < early, "displacement grew: early {} late {}", early, late);
    }

    #[test]
    fn point_outside_the_boundary_falls_back_without_panicking() {
        let mut rng = StdRng::seed_from_u64(11);
        let points = vec![Point::new(5.0, 5.0), Point::new(100.0, 100.0)];

        let result = relax(points, &square(), &mut rng).unwrap();

        assert_eq!(result.points.len(), 2);
        assert_eq!(result.collapsed.len(), 1);
        assert_eq!(result.collapsed[0].index, 1);
        // the outside point only gets dithered, not relocated
        assert!(result.points[1].distance(&Point::new(100.0, 100.0)) < 1e-3);
        assert_relative_eq!(result.points[0].x, 5.0, epsilon = 1e-3);
        assert_relative_eq!(result.points[0].y, 5.0, epsilon = 1e-3);
    }

    #[test]
    fn open_and_closed_boundaries_are_equivalent() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut closed = square();
        closed.push(closed[0]);

        let a = relax(vec![Point::new(4.0, 6.0)], &square(), &mut rng).unwrap();
        let b = relax(vec![Point::new(4.0, 6.0)], &closed, &mut rng).unwrap();

        assert_relative_eq!(a.points[0].x, b.points[0].x, epsilon = 1e-6);
        assert_relative_eq!(a.points[0].y, b.points[0].y, epsilon = 1e-6);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let mut rng = StdRng::seed_from_u64(13);

        let result = relax(Vec::new(), &square(), &mut rng).unwrap();

        assert!(result.points.is_empty());
        assert!(result.collapsed.is_empty());
    }

    #[test]
    fn observer_sees_one_closed_ring_per_point() {
        let mut rng = StdRng::seed_from_u64(14);
        let points = vec![Point::new(3.0, 4.0), Point::new(7.0, 6.0)];
        let mut collector = CellCollector::default();

        let result = relax_with(
            points,
            &square(),
            &RelaxParams::default(),
            &mut rng,
            |event| collector.record(event),
        )
        .unwrap();

        assert_eq!(collector.cells.len(), result.points.len());
        assert!(collector.collapsed.is_empty());

        for ring in &collector.cells {
            assert!(ring.len() > 3);
            assert_eq!(ring.first().unwrap(), ring.last().unwrap());
        }
    }
}
