// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local planar frame for metric computations
//!
//! Indoor features span at most a few kilometres, so an equirectangular
//! projection around a nearby reference point is accurate enough for hit
//! testing and area estimates.

use crate::error::{Error, Result};
use imdf_model::{BoundingRegion, Point};
use nalgebra::{Point2, Vector2};

/// Mean Earth radius in metres (IUGG)
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Metres per degree of latitude
const METRES_PER_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// Equirectangular projection centred on a reference point
///
/// `x` grows east and `y` grows north, both in metres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalFrame {
    origin: Point,
    cos_latitude: f64,
}

impl LocalFrame {
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            cos_latitude: origin.latitude.to_radians().cos(),
        }
    }

    /// Frame centred on the bounding box of `points`
    pub fn fit(points: &[Point]) -> Result<Self> {
        BoundingRegion::from_points(points.iter().copied())
            .map(|region| Self::new(region.center()))
            .ok_or(Error::EmptyGeometry)
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn project(&self, point: Point) -> Point2<f64> {
        Point2::new(
            (point.longitude - self.origin.longitude) * self.cos_latitude * METRES_PER_DEGREE,
            (point.latitude - self.origin.latitude) * METRES_PER_DEGREE,
        )
    }

    pub fn unproject(&self, point: Point2<f64>) -> Point {
        // Degenerate at the poles; indoor data never gets there.
        let cos = self.cos_latitude.max(f64::EPSILON);
        Point::new(
            self.origin.latitude + point.y / METRES_PER_DEGREE,
            self.origin.longitude + point.x / (cos * METRES_PER_DEGREE),
        )
    }

    pub fn project_all(&self, points: &[Point]) -> Vec<Point2<f64>> {
        points.iter().map(|p| self.project(*p)).collect()
    }

    /// Planar offset between two points, in metres
    pub fn offset(&self, from: Point, to: Point) -> Vector2<f64> {
        self.project(to) - self.project(from)
    }
}
