// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IMDF Model - Feature, geometry and property types for IMDF datasets
//!
//! This crate holds the in-memory form of an Indoor Mapping Data Format
//! dataset and the decode/encode contract with its GeoJSON files.
//!
//! # Overview
//!
//! - [`Feature`] - identity, typed properties and geometry, validated on construction
//! - [`FeatureProperties`] - one schema per [`FeatureCategory`]
//! - [`Geometry`] - point, polyline and polygon values with GeoJSON encoding
//! - [`ProjectManifest`] - project metadata stored in `manifest.json`
//!
//! # Example
//!
//! ```
//! use imdf_model::{AnchorProperties, Feature, FeatureCategory, FeatureId, Point};
//!
//! let anchor = Feature::new(
//!     FeatureId::new_random(),
//!     AnchorProperties::default(),
//!     Some(Point::new(37.3349, -122.0090).into()),
//! )?;
//! let record = anchor.encode()?;
//! let decoded = Feature::decode(FeatureCategory::Anchor, &record)?;
//! assert_eq!(decoded, anchor);
//! # Ok::<(), imdf_model::ImdfError>(())
//! ```

pub mod error;
pub mod feature;
pub mod geometry;
pub mod manifest;
pub mod properties;
pub mod types;

pub use error::*;
pub use feature::*;
pub use geometry::*;
pub use manifest::*;
pub use properties::*;
pub use types::*;
