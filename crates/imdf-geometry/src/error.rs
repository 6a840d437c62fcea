// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for geometry computations

use thiserror::Error;

/// Geometry computation result type
pub type Result<T> = std::result::Result<T, Error>;

/// Geometry computation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// No vertices to compute with
    #[error("Geometry has no vertices")]
    EmptyGeometry,

    /// Hole ring reaches outside the exterior ring
    #[error("Hole {index} is not contained in the exterior ring")]
    HoleOutsideExterior { index: usize },
}

impl Error {
    /// Create a hole containment error
    pub fn hole_outside(index: usize) -> Self {
        Error::HoleOutsideExterior { index }
    }
}
