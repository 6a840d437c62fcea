// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IMDF Geometry
//!
//! Metric computations over [`imdf_model`] geometry: great-circle distances,
//! lengths and areas, point-to-shape distances and point-in-polygon tests.
//!
//! Planar work happens in a [`LocalFrame`], an equirectangular projection in
//! metres around a nearby reference point.
//!
//! ## Quick Start
//!
//! ```rust
//! use imdf_geometry::{haversine_distance, polygon_contains};
//! use imdf_model::{Point, Polygon};
//!
//! let room = Polygon::new(vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(0.0, 0.001),
//!     Point::new(0.001, 0.001),
//!     Point::new(0.001, 0.0),
//! ]);
//! assert!(polygon_contains(&room, Point::new(0.0005, 0.0005)));
//!
//! let d = haversine_distance(Point::new(0.0, 0.0), Point::new(0.0, 0.001));
//! assert!((d - 111.2).abs() < 0.1);
//! ```

pub mod containment;
pub mod error;
pub mod measure;
pub mod projection;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use containment::{check_hole_containment, polygon_contains, ring_contains};
pub use error::{Error, Result};
pub use measure::{
    distance_to_geometry, distance_to_polygon_boundary, distance_to_polyline, geometry_extent,
    haversine_distance, point_segment_distance, polygon_area, polyline_length, ring_area,
    ring_perimeter,
};
pub use projection::{LocalFrame, EARTH_RADIUS_M};
