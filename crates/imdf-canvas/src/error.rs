// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for canvas interaction

use imdf_model::{FeatureId, ImdfError};
use thiserror::Error;

/// Canvas result type
pub type Result<T> = std::result::Result<T, CanvasError>;

/// Errors from the shape assembler and the canvas controller
///
/// Assembler errors leave the shape being drawn unchanged.
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Shape needs at least {required} vertices, has {actual}")]
    InsufficientVertices { required: usize, actual: usize },

    #[error("A shape is already being drawn")]
    SessionAlreadyActive,

    #[error("No shape is being drawn")]
    NoActiveSession,

    #[error("Shape is not ready to commit")]
    NotReady,

    #[error("Polygon is closed; undo the last vertex to keep editing")]
    ShapeClosed,

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Feature {0} not found")]
    FeatureNotFound(FeatureId),

    #[error(transparent)]
    Imdf(#[from] ImdfError),
}

impl CanvasError {
    /// Create an unsupported operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        CanvasError::UnsupportedOperation(msg.into())
    }
}
