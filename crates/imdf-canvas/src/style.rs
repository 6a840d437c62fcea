// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Overlay render-state policy

use crate::config::{StyleColors, StylePalette};
use imdf_model::FeatureProperties;
use serde::{Deserialize, Serialize};

/// What an overlay shows
#[derive(Clone, Copy, Debug)]
pub enum StyleTarget<'a> {
    /// A stored feature
    Feature(&'a FeatureProperties),
    /// Transient geometry with no properties (shape preview, measurement path)
    Sketch,
}

/// How the map widget should draw one overlay
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleDescriptor {
    pub stroke_color: [f32; 4],
    pub fill_color: [f32; 4],
    pub line_width: f32,
    /// Draw the closing edge of the outline
    pub closes_path: bool,
    /// Mark the last vertex (where the next tap connects)
    pub marks_endpoint: bool,
}

impl StyleDescriptor {
    fn from_colors(colors: &StyleColors, line_width: f32, drawing: bool) -> Self {
        Self {
            stroke_color: colors.stroke,
            fill_color: colors.fill,
            line_width,
            closes_path: !drawing,
            marks_endpoint: drawing,
        }
    }
}

/// Pick the style for an overlay
///
/// In-progress shapes win, then classified units, then the neutral style.
pub fn style_for(
    target: StyleTarget<'_>,
    is_actively_drawn: bool,
    palette: &StylePalette,
) -> StyleDescriptor {
    if is_actively_drawn {
        return StyleDescriptor::from_colors(&palette.drawing, palette.line_width, true);
    }
    let classified = match target {
        StyleTarget::Feature(properties) => properties
            .unit_category()
            .is_some_and(|category| category.is_specified()),
        StyleTarget::Sketch => false,
    };
    let colors = if classified {
        &palette.classified
    } else {
        &palette.neutral
    };
    StyleDescriptor::from_colors(colors, palette.line_width, false)
}
