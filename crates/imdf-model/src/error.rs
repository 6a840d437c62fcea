// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for IMDF decoding and archive operations

use crate::{FeatureCategory, FeatureId};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for model and archive operations
pub type Result<T> = std::result::Result<T, ImdfError>;

/// Errors that can occur while decoding, validating or persisting IMDF data
#[derive(Error, Debug)]
pub enum ImdfError {
    /// Geometry object is not valid GeoJSON or violates shape constraints
    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),

    /// Feature record has a bad id, missing or invalid properties
    #[error("Malformed feature data: {0}")]
    MalformedFeatureData(String),

    /// Loading a category file failed; the whole load is aborted
    #[error("Failed to load {category} features: {source}")]
    ArchiveLoad {
        category: FeatureCategory,
        #[source]
        source: Box<ImdfError>,
    },

    /// Feature id already present somewhere in the archive
    #[error("Duplicate feature identifier {0}")]
    DuplicateIdentifier(FeatureId),

    /// No feature with this id in the archive
    #[error("Feature {0} not found")]
    FeatureNotFound(FeatureId),

    /// Read or write failure at the filesystem boundary
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON syntax or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Project manifest is missing or unreadable
    #[error("Invalid manifest: {0}")]
    Manifest(String),
}

impl ImdfError {
    /// Create a malformed geometry error
    pub fn geometry(msg: impl Into<String>) -> Self {
        ImdfError::MalformedGeometry(msg.into())
    }

    /// Create a malformed feature data error
    pub fn feature(msg: impl Into<String>) -> Self {
        ImdfError::MalformedFeatureData(msg.into())
    }

    /// Wrap a failure that happened while loading `category`
    pub fn load(category: FeatureCategory, source: ImdfError) -> Self {
        ImdfError::ArchiveLoad {
            category,
            source: Box::new(source),
        }
    }

    /// Create an IO error tagged with the path involved
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ImdfError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a manifest error
    pub fn manifest(msg: impl Into<String>) -> Self {
        ImdfError::Manifest(msg.into())
    }

    /// Category whose load failed, if this is a load error
    pub fn failed_category(&self) -> Option<FeatureCategory> {
        match self {
            ImdfError::ArchiveLoad { category, .. } => Some(*category),
            _ => None,
        }
    }
}
