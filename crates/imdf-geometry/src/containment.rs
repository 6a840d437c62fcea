// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-in-polygon and ring containment

use crate::error::{Error, Result};
use imdf_model::{Point, Polygon};

/// Even-odd test against a single ring (closing edge implied)
///
/// Works directly in degrees: the equirectangular frame is an affine map, so
/// crossing parity is the same in either space.
pub fn ring_contains(ring: &[Point], point: Point) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let (x, y) = (point.longitude, point.latitude);
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].longitude, ring[i].latitude);
        let (xj, yj) = (ring[j].longitude, ring[j].latitude);
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Inside the exterior ring and outside every hole
pub fn polygon_contains(polygon: &Polygon, point: Point) -> bool {
    ring_contains(&polygon.exterior, point)
        && !polygon.holes.iter().any(|hole| ring_contains(hole, point))
}

/// Check that every hole vertex lies inside the exterior ring
///
/// Returns the first offending hole. Not part of model validity; callers use
/// it as a lint.
pub fn check_hole_containment(polygon: &Polygon) -> Result<()> {
    if polygon.exterior.is_empty() {
        return Err(Error::EmptyGeometry);
    }
    for (index, hole) in polygon.holes.iter().enumerate() {
        if !hole.iter().all(|v| ring_contains(&polygon.exterior, *v)) {
            return Err(Error::hole_outside(index));
        }
    }
    Ok(())
}
