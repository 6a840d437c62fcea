// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Project manifest (`manifest.json`)

use crate::error::{ImdfError, Result};
use crate::geometry::{MapRegion, Point};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// IMDF version written into new manifests
pub const IMDF_VERSION: &str = "1.0.0";

/// Last map viewport of an editing session
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MappingSession {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub span_latitude: f64,
    pub span_longitude: f64,
}

impl MappingSession {
    pub fn region(&self) -> MapRegion {
        MapRegion::new(
            Point::new(self.center_latitude, self.center_longitude),
            self.span_latitude,
            self.span_longitude,
        )
    }
}

impl From<MapRegion> for MappingSession {
    fn from(region: MapRegion) -> Self {
        Self {
            center_latitude: region.center.latitude,
            center_longitude: region.center.longitude,
            span_latitude: region.span_latitude,
            span_longitude: region.span_longitude,
        }
    }
}

/// Vendor extension declared by a dataset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDeclaration {
    pub provider: String,
    pub name: String,
    pub version: String,
}

/// Project metadata stored next to the feature files
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub uuid: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub client: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub imdf_version: String,
    pub session: Option<MappingSession>,
    pub extensions: Option<Vec<ExtensionDeclaration>>,
}

impl ProjectManifest {
    /// Fresh manifest stamped with the current time
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            description: None,
            client: None,
            created_at: now,
            updated_at: now,
            imdf_version: IMDF_VERSION.to_string(),
            session: None,
            extensions: None,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ImdfError::manifest(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
