// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shape assembler - turns a sequence of taps into point, polyline or
//! polygon geometry
//!
//! ```text
//! Empty --add--> Collecting --(enough vertices | close)--> Ready --commit--> (dropped)
//!   ^                |                                       |
//!   +----------------+------------- remove_last_vertex ------+
//! ```
//!
//! Points are ready after one vertex and polylines after two. Polygons stay
//! collecting until [`ShapeAssembler::close`] succeeds.

use crate::error::{CanvasError, Result};
use imdf_archive::Archive;
use imdf_model::{
    Feature, FeatureId, FeatureProperties, Geometry, GeometryKind, ImdfError, Point, Polygon,
    Polyline,
};
use serde::{Deserialize, Serialize};

/// Progress of the shape being drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssemblerState {
    Empty,
    Collecting,
    Ready,
}

/// In-progress shape
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeAssembler {
    kind: GeometryKind,
    vertices: Vec<Point>,
    closed: bool,
}

impl ShapeAssembler {
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            kind,
            vertices: Vec::new(),
            closed: false,
        }
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn state(&self) -> AssemblerState {
        let ready = match self.kind {
            GeometryKind::Point => self.vertices.len() == 1,
            GeometryKind::Polyline => self.vertices.len() >= 2,
            GeometryKind::Polygon => self.closed,
        };
        if self.vertices.is_empty() {
            AssemblerState::Empty
        } else if ready {
            AssemblerState::Ready
        } else {
            AssemblerState::Collecting
        }
    }

    /// Append a tapped vertex
    ///
    /// A point shape replaces its single vertex. Repeating the previous
    /// vertex is ignored. On a polygon, tapping the first vertex again closes
    /// the ring once it has enough vertices; any other repeat is rejected,
    /// since ring vertices must be distinct.
    pub fn add_vertex(&mut self, point: Point) -> Result<()> {
        if self.closed {
            return Err(CanvasError::ShapeClosed);
        }
        if !point.is_valid() {
            return Err(ImdfError::geometry(format!(
                "vertex ({}, {}) is outside WGS-84 range",
                point.latitude, point.longitude
            ))
            .into());
        }

        match self.kind {
            GeometryKind::Point => {
                self.vertices.clear();
                self.vertices.push(point);
            }
            _ if self.vertices.last() == Some(&point) => {
                log::debug!("Ignoring repeated vertex");
                return Ok(());
            }
            GeometryKind::Polygon if self.vertices.contains(&point) => {
                if self.vertices.first() == Some(&point) {
                    return self.close();
                }
                return Err(ImdfError::geometry(format!(
                    "vertex ({}, {}) is already part of the ring",
                    point.latitude, point.longitude
                ))
                .into());
            }
            _ => self.vertices.push(point),
        }
        log::debug!(
            "{} vertex {} added, state {:?}",
            self.kind,
            self.vertices.len(),
            self.state()
        );
        Ok(())
    }

    /// Drop the last vertex, reopening a closed polygon
    pub fn remove_last_vertex(&mut self) -> Option<Point> {
        let removed = self.vertices.pop();
        self.closed = false;
        removed
    }

    /// Close a polygon ring
    pub fn close(&mut self) -> Result<()> {
        if self.kind != GeometryKind::Polygon {
            return Err(CanvasError::unsupported(format!(
                "cannot close a {}",
                self.kind
            )));
        }
        let required = GeometryKind::Polygon.min_vertices();
        if self.vertices.len() < required {
            return Err(CanvasError::InsufficientVertices {
                required,
                actual: self.vertices.len(),
            });
        }
        self.closed = true;
        Ok(())
    }

    /// Finished geometry; fails unless the shape is ready and valid
    pub fn geometry(&self) -> Result<Geometry> {
        if self.state() != AssemblerState::Ready {
            return Err(CanvasError::NotReady);
        }
        let geometry = match self.kind {
            GeometryKind::Point => Geometry::Point(self.vertices[0]),
            GeometryKind::Polyline => Geometry::Polyline(Polyline::new(self.vertices.clone())),
            GeometryKind::Polygon => Geometry::Polygon(Polygon::new(self.vertices.clone())),
        };
        if !geometry.is_valid() {
            return Err(ImdfError::geometry(format!("drawn {} is not valid", self.kind)).into());
        }
        Ok(geometry)
    }

    /// Geometry to show while drawing
    ///
    /// Unclosed polygons preview as an open path. The result is not
    /// necessarily a valid shape.
    pub fn preview(&self) -> Option<Geometry> {
        match (self.kind, self.vertices.len()) {
            (_, 0) => None,
            (_, 1) => Some(Geometry::Point(self.vertices[0])),
            (GeometryKind::Polygon, _) if self.closed => {
                Some(Geometry::Polygon(Polygon::new(self.vertices.clone())))
            }
            _ => Some(Geometry::Polyline(Polyline::new(self.vertices.clone()))),
        }
    }

    /// Store the shape as a new feature with a fresh id
    ///
    /// The assembler is left as is; the caller drops it on success.
    pub fn commit(
        &self,
        properties: impl Into<FeatureProperties>,
        archive: &mut Archive,
    ) -> Result<FeatureId> {
        let geometry = self.geometry()?;
        let id = archive.generate_unused_id();
        let feature = Feature::new(id, properties, Some(geometry))?;
        archive.add_feature(feature)?;
        log::info!("Committed {} with {} vertices", id, self.vertices.len());
        Ok(id)
    }

    /// Discard all vertices
    pub fn cancel(&mut self) {
        self.vertices.clear();
        self.closed = false;
    }
}
