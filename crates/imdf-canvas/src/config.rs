// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canvas configuration

use imdf_model::FeatureCategory;
use serde::{Deserialize, Serialize};

/// Stroke and fill colours, RGBA in 0.0-1.0
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleColors {
    pub stroke: [f32; 4],
    pub fill: [f32; 4],
}

impl StyleColors {
    /// Opaque stroke with a translucent fill of the same hue
    pub fn from_rgb(r: u8, g: u8, b: u8, fill_alpha: f32) -> Self {
        let rgb = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0];
        Self {
            stroke: [rgb[0], rgb[1], rgb[2], 1.0],
            fill: [rgb[0], rgb[1], rgb[2], fill_alpha],
        }
    }
}

/// Fill alpha shared by every default style
pub const DEFAULT_FILL_ALPHA: f32 = 0.3;

/// Colours for the three render states
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePalette {
    /// Shape currently being drawn
    pub drawing: StyleColors,
    /// Units with an assigned category
    pub classified: StyleColors,
    /// Everything else
    pub neutral: StyleColors,
    /// Stroke width in points
    pub line_width: f32,
}

impl Default for StylePalette {
    fn default() -> Self {
        Self {
            drawing: StyleColors::from_rgb(0, 122, 255, DEFAULT_FILL_ALPHA), // system blue
            classified: StyleColors::from_rgb(52, 199, 89, DEFAULT_FILL_ALPHA), // system green
            neutral: StyleColors::from_rgb(142, 142, 147, DEFAULT_FILL_ALPHA), // system gray
            line_width: 2.0,
        }
    }
}

/// Canvas behaviour settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Tap radius for hit testing, in screen points
    pub hit_tolerance_points: f64,
    /// Categories whose point features may be dragged
    pub draggable_categories: Vec<FeatureCategory>,
    pub palette: StylePalette,
    /// Extra margin when framing data, as a fraction of its span
    pub region_padding: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            hit_tolerance_points: 22.0,
            draggable_categories: vec![FeatureCategory::Anchor],
            palette: StylePalette::default(),
            region_padding: 0.2,
        }
    }
}

impl CanvasConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hit_tolerance(mut self, points: f64) -> Self {
        self.hit_tolerance_points = points;
        self
    }

    pub fn with_draggable(mut self, categories: Vec<FeatureCategory>) -> Self {
        self.draggable_categories = categories;
        self
    }

    pub fn with_palette(mut self, palette: StylePalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_region_padding(mut self, padding: f64) -> Self {
        self.region_padding = padding;
        self
    }

    pub fn is_draggable(&self, category: FeatureCategory) -> bool {
        self.draggable_categories.contains(&category)
    }

    /// Parse from JSON; missing keys keep their defaults
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
