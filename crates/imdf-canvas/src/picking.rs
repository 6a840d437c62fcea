// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hit testing and selection state

use crate::widget::{MapWidget, ScreenPoint};
use imdf_geometry::{
    distance_to_geometry, geometry_extent, haversine_distance, polygon_contains,
};
use imdf_model::{Feature, FeatureId, Geometry, Point};
use rustc_hash::FxHashSet;
use std::cmp::Ordering;

/// Current selection
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    selected: FxHashSet<FeatureId>,
}

impl SelectionState {
    pub fn is_selected(&self, id: FeatureId) -> bool {
        self.selected.contains(&id)
    }

    /// Select a single feature (clears previous selection)
    pub fn select(&mut self, id: FeatureId) {
        self.selected.clear();
        self.selected.insert(id);
    }

    pub fn toggle(&mut self, id: FeatureId) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    pub fn remove(&mut self, id: FeatureId) {
        self.selected.remove(&id);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.selected.iter().copied()
    }
}

/// A feature under the tap
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub id: FeatureId,
    /// 0 point, 1 line, 2 area
    pub dimension: u8,
    /// Metres from the tap; 0 when inside a polygon
    pub distance: f64,
    /// Area or length, used to prefer the smaller of overlapping shapes
    pub extent: f64,
}

impl Hit {
    fn rank(&self, other: &Hit) -> Ordering {
        self.dimension
            .cmp(&other.dimension)
            .then(self.distance.total_cmp(&other.distance))
            .then(self.extent.total_cmp(&other.extent))
    }
}

/// Convert a tolerance in screen points to metres at `at`
pub fn tolerance_in_metres<W: MapWidget + ?Sized>(
    widget: &W,
    at: ScreenPoint,
    points: f64,
) -> f64 {
    let center = widget.convert_screen_point_to_coordinate(at);
    let edge = widget.convert_screen_point_to_coordinate(ScreenPoint::new(at.x + points, at.y));
    haversine_distance(center, edge)
}

fn hit_for(feature: &Feature, tap: Point, tolerance: f64) -> Option<Hit> {
    let geometry = feature.geometry()?;
    let dimension = geometry.kind().dimension();
    let distance = match geometry {
        Geometry::Polygon(polygon) if polygon_contains(polygon, tap) => 0.0,
        other => distance_to_geometry(other, tap),
    };
    (distance <= tolerance).then(|| Hit {
        id: feature.id(),
        dimension,
        distance,
        extent: geometry_extent(geometry),
    })
}

/// Every feature hit by a tap, best match first
pub fn candidates<'a>(
    features: impl IntoIterator<Item = &'a Feature>,
    tap: Point,
    tolerance_m: f64,
) -> Vec<Hit> {
    let mut hits: Vec<Hit> = features
        .into_iter()
        .filter_map(|f| hit_for(f, tap, tolerance_m))
        .collect();
    hits.sort_by(Hit::rank);
    hits
}

/// Best feature under a tap
///
/// Points beat lines beat areas; then nearer beats farther; then smaller
/// beats larger, so a unit wins over the venue around it.
pub fn hit_test<'a>(
    features: impl IntoIterator<Item = &'a Feature>,
    tap: Point,
    tolerance_m: f64,
) -> Option<FeatureId> {
    let mut best: Option<Hit> = None;
    for hit in features
        .into_iter()
        .filter_map(|f| hit_for(f, tap, tolerance_m))
    {
        if best.map_or(true, |b| hit.rank(&b) == Ordering::Less) {
            best = Some(hit);
        }
    }
    best.map(|h| h.id)
}
