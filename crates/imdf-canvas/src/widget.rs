// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interface to the host map view

use crate::style::StyleDescriptor;
use imdf_model::{FeatureId, Geometry, MapRegion, Point};
use serde::{Deserialize, Serialize};

/// Position in view coordinates (points, origin top-left)
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Key of an overlay on the map
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayId {
    Feature(FeatureId),
    /// Shape being drawn
    Preview,
    /// Measurement path
    Measurement,
}

/// Map view operations the canvas relies on
///
/// The map itself (tiles, gestures, drawing) belongs to the host. Adding an
/// overlay or annotation under an id that is already shown replaces it.
pub trait MapWidget {
    /// Geographic position under a view point
    fn convert_screen_point_to_coordinate(&self, point: ScreenPoint) -> Point;

    fn add_overlay(&mut self, id: OverlayId, geometry: &Geometry, style: &StyleDescriptor);

    fn remove_overlay(&mut self, id: OverlayId);

    /// Pin for a point feature
    fn add_annotation(&mut self, id: FeatureId, coordinate: Point, draggable: bool);

    fn remove_annotation(&mut self, id: FeatureId);

    fn set_visible_region(&mut self, region: &MapRegion);
}
