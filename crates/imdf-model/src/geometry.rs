// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry value types and their GeoJSON form
//!
//! Coordinates are WGS-84 decimal degrees. GeoJSON positions are written as
//! `[longitude, latitude]` pairs. Polygon rings are stored once in memory and
//! closed by repeating the first vertex on the wire.

use crate::error::{ImdfError, Result};
use crate::types::GeometryKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

/// Geographic position
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and inside the WGS-84 range
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    fn to_position(self) -> Value {
        json!([self.longitude, self.latitude])
    }

    fn from_position(value: &Value) -> Result<Self> {
        let pair = value
            .as_array()
            .filter(|a| a.len() == 2)
            .ok_or_else(|| ImdfError::geometry(format!("position is not a pair: {}", value)))?;
        let longitude = pair[0].as_f64();
        let latitude = pair[1].as_f64();
        match (latitude, longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Ok(Point::new(lat, lng))
            }
            _ => Err(ImdfError::geometry(format!(
                "position is not a pair of finite numbers: {}",
                value
            ))),
        }
    }
}

/// Open path of at least two vertices
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Polyline {
    pub points: Vec<Point>,
}

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// At least 2 valid points and no zero-length edge
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 2
            && self.points.iter().all(Point::is_valid)
            && self.points.windows(2).all(|w| w[0] != w[1])
    }
}

/// Closed area with optional holes
///
/// Rings hold each vertex once; the closing edge back to the first vertex is
/// implicit.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Polygon {
    pub exterior: Vec<Point>,
    pub holes: Vec<Vec<Point>>,
}

impl Polygon {
    pub fn new(exterior: Vec<Point>) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(exterior: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        Self { exterior, holes }
    }

    /// Every ring has at least 3 valid, pairwise distinct vertices
    pub fn is_valid(&self) -> bool {
        ring_is_valid(&self.exterior) && self.holes.iter().all(|h| ring_is_valid(h))
    }
}

fn ring_is_valid(ring: &[Point]) -> bool {
    if ring.len() < 3 || !ring.iter().all(Point::is_valid) {
        return false;
    }
    ring.iter()
        .enumerate()
        .all(|(i, a)| ring[i + 1..].iter().all(|b| a != b))
}

/// Geometry of a feature
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Point(Point),
    Polyline(Polyline),
    Polygon(Polygon),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::Polyline(_) => GeometryKind::Polyline,
            Geometry::Polygon(_) => GeometryKind::Polygon,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Geometry::Point(p) => p.is_valid(),
            Geometry::Polyline(l) => l.is_valid(),
            Geometry::Polygon(p) => p.is_valid(),
        }
    }

    /// All vertices, exterior ring first for polygons
    pub fn vertices(&self) -> Vec<Point> {
        match self {
            Geometry::Point(p) => vec![*p],
            Geometry::Polyline(l) => l.points.clone(),
            Geometry::Polygon(p) => p
                .exterior
                .iter()
                .chain(p.holes.iter().flatten())
                .copied()
                .collect(),
        }
    }

    /// Smallest latitude/longitude box holding every vertex
    pub fn bounding_region(&self) -> Option<BoundingRegion> {
        BoundingRegion::from_points(self.vertices())
    }

    /// Encode as a GeoJSON geometry object
    pub fn to_geojson(&self) -> Value {
        match self {
            Geometry::Point(p) => json!({
                "type": "Point",
                "coordinates": p.to_position(),
            }),
            Geometry::Polyline(l) => json!({
                "type": "LineString",
                "coordinates": l.points.iter().map(|p| p.to_position()).collect::<Vec<_>>(),
            }),
            Geometry::Polygon(p) => {
                let rings: Vec<Value> = std::iter::once(&p.exterior)
                    .chain(p.holes.iter())
                    .map(|ring| encode_ring(ring))
                    .collect();
                json!({
                    "type": "Polygon",
                    "coordinates": rings,
                })
            }
        }
    }

    /// Decode a GeoJSON geometry object
    ///
    /// The result is always a valid shape; anything else is
    /// [`ImdfError::MalformedGeometry`].
    pub fn from_geojson(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| ImdfError::geometry("geometry is not an object"))?;
        let geometry_type = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ImdfError::geometry("missing geometry type"))?;
        let coordinates = object
            .get("coordinates")
            .ok_or_else(|| ImdfError::geometry("missing coordinates"))?;

        let geometry = match geometry_type {
            "Point" => Geometry::Point(Point::from_position(coordinates)?),
            "LineString" => Geometry::Polyline(Polyline::new(decode_positions(coordinates)?)),
            "Polygon" => {
                let rings = coordinates
                    .as_array()
                    .ok_or_else(|| ImdfError::geometry("polygon coordinates are not an array"))?;
                let mut rings = rings.iter().map(decode_ring);
                let exterior = rings
                    .next()
                    .ok_or_else(|| ImdfError::geometry("polygon has no rings"))??;
                let holes = rings.collect::<Result<Vec<_>>>()?;
                Geometry::Polygon(Polygon::with_holes(exterior, holes))
            }
            other => {
                return Err(ImdfError::geometry(format!(
                    "unsupported geometry type '{}'",
                    other
                )))
            }
        };

        if !geometry.is_valid() {
            return Err(ImdfError::geometry(format!(
                "invalid {} shape",
                geometry.kind()
            )));
        }
        Ok(geometry)
    }
}

impl From<Point> for Geometry {
    fn from(p: Point) -> Self {
        Geometry::Point(p)
    }
}

impl From<Polyline> for Geometry {
    fn from(l: Polyline) -> Self {
        Geometry::Polyline(l)
    }
}

impl From<Polygon> for Geometry {
    fn from(p: Polygon) -> Self {
        Geometry::Polygon(p)
    }
}

impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_geojson().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Geometry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Geometry::from_geojson(&value).map_err(serde::de::Error::custom)
    }
}

fn encode_ring(ring: &[Point]) -> Value {
    let mut positions: Vec<Value> = ring.iter().map(|p| p.to_position()).collect();
    if let Some(first) = ring.first() {
        positions.push(first.to_position());
    }
    Value::Array(positions)
}

fn decode_positions(value: &Value) -> Result<Vec<Point>> {
    value
        .as_array()
        .ok_or_else(|| ImdfError::geometry("coordinates are not an array of positions"))?
        .iter()
        .map(Point::from_position)
        .collect()
}

fn decode_ring(value: &Value) -> Result<Vec<Point>> {
    let mut ring = decode_positions(value)?;
    if ring.len() < 4 {
        return Err(ImdfError::geometry(format!(
            "ring has {} positions, at least 4 required",
            ring.len()
        )));
    }
    if ring.first() != ring.last() {
        return Err(ImdfError::geometry("ring is not closed"));
    }
    ring.pop();
    Ok(ring)
}

/// Serde adapter for an optional point stored as a GeoJSON Point object
/// (used for `display_point`).
pub mod optional_point_object {
    use super::{Geometry, Point};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(
        point: &Option<Point>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match point {
            Some(p) => Geometry::Point(*p).to_geojson().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Option<Point>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(None);
        }
        match Geometry::from_geojson(&value).map_err(serde::de::Error::custom)? {
            Geometry::Point(p) => Ok(Some(p)),
            other => Err(serde::de::Error::custom(format!(
                "display point must be a Point, found {}",
                other.kind()
            ))),
        }
    }
}

/// Latitude/longitude bounding box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    pub min_latitude: f64,
    pub min_longitude: f64,
    pub max_latitude: f64,
    pub max_longitude: f64,
}

/// Smallest span used when framing a region, in degrees (roughly 50 m)
const MIN_SPAN_DEGREES: f64 = 0.0005;

impl BoundingRegion {
    /// Degenerate region around a single point
    pub fn around(point: Point) -> Self {
        Self {
            min_latitude: point.latitude,
            min_longitude: point.longitude,
            max_latitude: point.latitude,
            max_longitude: point.longitude,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::around(first), |region, p| region.including(p)))
    }

    pub fn including(mut self, point: Point) -> Self {
        self.min_latitude = self.min_latitude.min(point.latitude);
        self.min_longitude = self.min_longitude.min(point.longitude);
        self.max_latitude = self.max_latitude.max(point.latitude);
        self.max_longitude = self.max_longitude.max(point.longitude);
        self
    }

    pub fn merge(&self, other: &BoundingRegion) -> Self {
        Self {
            min_latitude: self.min_latitude.min(other.min_latitude),
            min_longitude: self.min_longitude.min(other.min_longitude),
            max_latitude: self.max_latitude.max(other.max_latitude),
            max_longitude: self.max_longitude.max(other.max_longitude),
        }
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_latitude + self.max_latitude) / 2.0,
            (self.min_longitude + self.max_longitude) / 2.0,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }

    /// Viewport showing the whole box, grown by `padding` (0.2 adds 20%)
    pub fn to_map_region(&self, padding: f64) -> MapRegion {
        let scale = 1.0 + padding.max(0.0);
        MapRegion {
            center: self.center(),
            span_latitude: ((self.max_latitude - self.min_latitude) * scale).max(MIN_SPAN_DEGREES),
            span_longitude: ((self.max_longitude - self.min_longitude) * scale)
                .max(MIN_SPAN_DEGREES),
        }
    }
}

/// Visible map viewport: center plus latitude/longitude span in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub center: Point,
    pub span_latitude: f64,
    pub span_longitude: f64,
}

impl MapRegion {
    pub fn new(center: Point, span_latitude: f64, span_longitude: f64) -> Self {
        Self {
            center,
            span_latitude,
            span_longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> Point {
        Point::new(lat, lng)
    }

    fn square() -> Vec<Point> {
        vec![p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)]
    }

    #[test]
    fn test_polygon_vertex_minimum() {
        assert!(!Polygon::new(vec![p(0.0, 0.0), p(0.0, 1.0)]).is_valid());
        assert!(Polygon::new(vec![p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0)]).is_valid());
    }

    #[test]
    fn test_polygon_repeated_vertex_is_invalid() {
        let ring = vec![p(0.0, 0.0), p(0.0, 1.0), p(0.0, 0.0), p(1.0, 1.0)];
        assert!(!Polygon::new(ring).is_valid());
    }

    #[test]
    fn test_polyline_rejects_zero_length_edge() {
        assert!(Polyline::new(vec![p(0.0, 0.0), p(0.0, 1.0)]).is_valid());
        assert!(!Polyline::new(vec![p(0.0, 0.0), p(0.0, 0.0)]).is_valid());
        assert!(!Polyline::new(vec![p(0.0, 0.0)]).is_valid());
    }

    #[test]
    fn test_point_range() {
        assert!(p(37.33, -122.03).is_valid());
        assert!(!p(91.0, 0.0).is_valid());
        assert!(!p(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_polygon_encodes_closed_ring() {
        let value = Geometry::Polygon(Polygon::new(square())).to_geojson();
        let ring = value["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        // [lng, lat]
        assert_eq!(ring[1], json!([1.0, 0.0]));
    }

    #[test]
    fn test_polygon_with_hole_round_trip() {
        let hole = vec![p(0.2, 0.2), p(0.2, 0.4), p(0.4, 0.4)];
        let polygon = Geometry::Polygon(Polygon::with_holes(square(), vec![hole]));
        let decoded = Geometry::from_geojson(&polygon.to_geojson()).unwrap();
        assert_eq!(decoded, polygon);
    }

    #[test]
    fn test_unclosed_ring_fails() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]]
        });
        let err = Geometry::from_geojson(&value).unwrap_err();
        assert!(matches!(err, ImdfError::MalformedGeometry(_)));
    }

    #[test]
    fn test_short_ring_fails() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]
        });
        assert!(Geometry::from_geojson(&value).is_err());
    }

    #[test]
    fn test_bad_positions_fail() {
        let triple = json!({"type": "Point", "coordinates": [1.0, 2.0, 3.0]});
        let text = json!({"type": "Point", "coordinates": ["1.0", 2.0]});
        assert!(Geometry::from_geojson(&triple).is_err());
        assert!(Geometry::from_geojson(&text).is_err());
    }

    #[test]
    fn test_unsupported_type_fails() {
        let value = json!({"type": "MultiPoint", "coordinates": [[0.0, 0.0]]});
        assert!(Geometry::from_geojson(&value).is_err());
        assert!(Geometry::from_geojson(&json!({"coordinates": [0.0, 0.0]})).is_err());
    }

    #[test]
    fn test_bounding_region_and_framing() {
        let region = Geometry::Polygon(Polygon::new(square()))
            .bounding_region()
            .unwrap();
        assert_eq!(region.center(), p(0.5, 0.5));

        let framed = region.to_map_region(0.5);
        assert_eq!(framed.span_latitude, 1.5);
        assert_eq!(framed.span_longitude, 1.5);

        let single = BoundingRegion::around(p(10.0, 10.0)).to_map_region(0.2);
        assert!(single.span_latitude > 0.0);
    }
}
