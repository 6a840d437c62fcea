// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lengths, areas and distances in metres

use crate::projection::{LocalFrame, EARTH_RADIUS_M};
use imdf_model::{Geometry, Point, Polygon};
use nalgebra::Point2;

/// Great-circle distance between two points
pub fn haversine_distance(a: Point, b: Point) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Sum of great-circle edge lengths
pub fn polyline_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(w[0], w[1]))
        .sum()
}

/// Perimeter of a ring including the closing edge
pub fn ring_perimeter(ring: &[Point]) -> f64 {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 => {
            polyline_length(ring) + haversine_distance(*last, *first)
        }
        _ => 0.0,
    }
}

/// Unsigned area enclosed by a ring (shoelace in a local frame)
pub fn ring_area(ring: &[Point]) -> f64 {
    let Ok(frame) = LocalFrame::fit(ring) else {
        return 0.0;
    };
    let pts = frame.project_all(ring);
    signed_area(&pts).abs()
}

fn signed_area(pts: &[Point2<f64>]) -> f64 {
    let n = pts.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Exterior area minus hole areas
pub fn polygon_area(polygon: &Polygon) -> f64 {
    let holes: f64 = polygon.holes.iter().map(|h| ring_area(h)).sum();
    (ring_area(&polygon.exterior) - holes).max(0.0)
}

/// Distance from `p` to segment `a`-`b` in planar coordinates
pub fn point_segment_distance(p: Point2<f64>, a: Point2<f64>, b: Point2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < 1e-18 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Shortest distance from `point` to an open path
pub fn distance_to_polyline(points: &[Point], point: Point) -> f64 {
    let frame = LocalFrame::new(point);
    let target = frame.project(point);
    let pts = frame.project_all(points);
    match pts.len() {
        0 => f64::INFINITY,
        1 => (target - pts[0]).norm(),
        _ => pts
            .windows(2)
            .map(|w| point_segment_distance(target, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

fn distance_to_ring(ring: &[Point], frame: &LocalFrame, target: Point2<f64>) -> f64 {
    let pts = frame.project_all(ring);
    let n = pts.len();
    if n == 0 {
        return f64::INFINITY;
    }
    (0..n)
        .map(|i| point_segment_distance(target, pts[i], pts[(i + 1) % n]))
        .fold(f64::INFINITY, f64::min)
}

/// Shortest distance from `point` to any ring edge of `polygon`
pub fn distance_to_polygon_boundary(polygon: &Polygon, point: Point) -> f64 {
    let frame = LocalFrame::new(point);
    let target = frame.project(point);
    std::iter::once(&polygon.exterior)
        .chain(polygon.holes.iter())
        .map(|ring| distance_to_ring(ring, &frame, target))
        .fold(f64::INFINITY, f64::min)
}

/// Shortest distance from `point` to the geometry's vertices or edges
pub fn distance_to_geometry(geometry: &Geometry, point: Point) -> f64 {
    match geometry {
        Geometry::Point(p) => haversine_distance(*p, point),
        Geometry::Polyline(line) => distance_to_polyline(&line.points, point),
        Geometry::Polygon(polygon) => distance_to_polygon_boundary(polygon, point),
    }
}

/// Size measure used to rank overlapping candidates: area for polygons,
/// length for polylines, zero for points
pub fn geometry_extent(geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::Point(_) => 0.0,
        Geometry::Polyline(line) => polyline_length(&line.points),
        Geometry::Polygon(polygon) => polygon_area(polygon),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, size),
            Point::new(size, size),
            Point::new(size, 0.0),
        ]
    }

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let d = haversine_distance(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        assert_relative_eq!(d, 111_195.08, max_relative = 1e-5);
    }

    #[test]
    fn test_haversine_is_symmetric_and_zero_on_identity() {
        let a = Point::new(51.5007, -0.1246);
        let b = Point::new(48.8584, 2.2945);
        assert_relative_eq!(haversine_distance(a, b), haversine_distance(b, a));
        assert_eq!(haversine_distance(a, a), 0.0);
        // London to Paris is about 340 km
        assert_relative_eq!(haversine_distance(a, b), 340_500.0, max_relative = 0.01);
    }

    #[test]
    fn test_polyline_length_sums_edges() {
        let path = vec![Point::new(0.0, 0.0), Point::new(0.001, 0.0), Point::new(0.002, 0.0)];
        let total = polyline_length(&path);
        let single = haversine_distance(path[0], path[2]);
        assert_relative_eq!(total, single, max_relative = 1e-9);
        assert_eq!(polyline_length(&path[..1]), 0.0);
    }

    #[test]
    fn test_ring_area_of_small_square() {
        // 0.001 degree square at the equator is about 111.2 m on a side
        let area = ring_area(&square(0.001));
        assert_relative_eq!(area, 12_364.3, max_relative = 1e-3);
    }

    #[test]
    fn test_polygon_area_subtracts_holes() {
        let hole = vec![
            Point::new(0.0002, 0.0002),
            Point::new(0.0002, 0.0007),
            Point::new(0.0007, 0.0007),
            Point::new(0.0007, 0.0002),
        ];
        let polygon = Polygon::with_holes(square(0.001), vec![hole.clone()]);
        let expected = ring_area(&square(0.001)) - ring_area(&hole);
        assert_relative_eq!(polygon_area(&polygon), expected, max_relative = 1e-9);
        assert_relative_eq!(ring_area(&hole) / ring_area(&square(0.001)), 0.25, max_relative = 1e-3);
    }

    #[test]
    fn test_distance_to_polyline_perpendicular() {
        let line = vec![Point::new(0.0, 0.0), Point::new(0.0, 0.001)];
        let query = Point::new(0.0001, 0.0005);
        let d = distance_to_polyline(&line, query);
        assert_relative_eq!(d, 11.1195, max_relative = 1e-3);
    }

    #[test]
    fn test_distance_to_polygon_boundary_from_inside() {
        let polygon = Polygon::new(square(0.001));
        let center = Point::new(0.0005, 0.0005);
        let d = distance_to_polygon_boundary(&polygon, center);
        assert_relative_eq!(d, 55.6, max_relative = 1e-3);
    }

    #[test]
    fn test_segment_distance_clamps_to_endpoints() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        assert_relative_eq!(point_segment_distance(Point2::new(-3.0, 4.0), a, b), 5.0);
        assert_relative_eq!(point_segment_distance(Point2::new(5.0, 2.0), a, b), 2.0);
    }
}
