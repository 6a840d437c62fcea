// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IMDF features: identity, properties and geometry

use crate::error::{ImdfError, Result};
use crate::geometry::Geometry;
use crate::properties::FeatureProperties;
use crate::types::{FeatureCategory, FeatureId};
use serde_json::{json, Map, Value};

/// Top-level members of a feature record; anything else is rejected
const FEATURE_MEMBERS: [&str; 5] = ["type", "id", "feature_type", "geometry", "properties"];

/// A single IMDF feature
///
/// Fields are private: every `Feature` in memory went through [`Feature::new`]
/// (or a checked setter), so its geometry is valid and legal for its
/// category.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    id: FeatureId,
    properties: FeatureProperties,
    geometry: Option<Geometry>,
}

/// Check that `geometry` is valid and allowed for `category`
fn check_geometry(category: FeatureCategory, geometry: Option<&Geometry>) -> Result<()> {
    if let Some(geometry) = geometry {
        if !geometry.is_valid() {
            return Err(ImdfError::geometry(format!(
                "invalid {} geometry",
                geometry.kind()
            )));
        }
    }
    let kind = geometry.map(Geometry::kind);
    if !category.geometry_rule().accepts(kind) {
        return Err(ImdfError::feature(match kind {
            Some(kind) => format!("{} features cannot have {} geometry", category, kind),
            None => format!("{} features require geometry", category),
        }));
    }
    Ok(())
}

impl Feature {
    /// Create a feature, validating geometry against the category rule
    pub fn new(
        id: FeatureId,
        properties: impl Into<FeatureProperties>,
        geometry: Option<Geometry>,
    ) -> Result<Self> {
        let properties = properties.into();
        check_geometry(properties.category(), geometry.as_ref())?;
        Ok(Self {
            id,
            properties,
            geometry,
        })
    }

    pub fn id(&self) -> FeatureId {
        self.id
    }

    pub fn category(&self) -> FeatureCategory {
        self.properties.category()
    }

    pub fn properties(&self) -> &FeatureProperties {
        &self.properties
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Replace the geometry; the feature is unchanged on error
    pub fn set_geometry(&mut self, geometry: Option<Geometry>) -> Result<()> {
        check_geometry(self.category(), geometry.as_ref())?;
        self.geometry = geometry;
        Ok(())
    }

    /// Replace the properties; the category must stay the same
    pub fn set_properties(&mut self, properties: FeatureProperties) -> Result<()> {
        if properties.category() != self.category() {
            return Err(ImdfError::feature(format!(
                "cannot change {} feature {} into {}",
                self.category(),
                self.id,
                properties.category()
            )));
        }
        self.properties = properties;
        Ok(())
    }

    /// Decode one GeoJSON feature record belonging to `category`'s file
    ///
    /// Unknown top-level members are rejected, as unknown property keys are,
    /// so that encoding the result reproduces the record's member set.
    pub fn decode(category: FeatureCategory, raw: &Value) -> Result<Self> {
        let object = raw
            .as_object()
            .ok_or_else(|| ImdfError::feature("feature record is not an object"))?;

        if let Some(unknown) = object
            .keys()
            .find(|key| !FEATURE_MEMBERS.contains(&key.as_str()))
        {
            return Err(ImdfError::feature(format!(
                "unknown feature member '{}'",
                unknown
            )));
        }

        match object.get("type").and_then(Value::as_str) {
            Some("Feature") => {}
            Some(other) => {
                return Err(ImdfError::feature(format!(
                    "expected type 'Feature', found '{}'",
                    other
                )))
            }
            None => return Err(ImdfError::feature("missing 'type' member")),
        }

        let id = decode_id(object)?;

        match object.get("feature_type") {
            None | Some(Value::Null) => {}
            Some(Value::String(name)) if name == category.name() => {}
            Some(other) => {
                return Err(ImdfError::feature(format!(
                    "feature {} has feature_type {} in the {} collection",
                    id, other, category
                )))
            }
        }

        let properties = match object.get("properties") {
            None | Some(Value::Null) => {
                return Err(ImdfError::feature(format!(
                    "feature {} has no properties",
                    id
                )))
            }
            Some(raw) => FeatureProperties::decode(category, raw)?,
        };

        let geometry = match object.get("geometry") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(Geometry::from_geojson(raw)?),
        };

        Feature::new(id, properties, geometry)
    }

    /// Encode as a GeoJSON feature record
    pub fn encode(&self) -> Result<Value> {
        let geometry = self
            .geometry
            .as_ref()
            .map(Geometry::to_geojson)
            .unwrap_or(Value::Null);
        Ok(json!({
            "type": "Feature",
            "id": self.id.to_string(),
            "feature_type": self.category().name(),
            "geometry": geometry,
            "properties": self.properties.encode()?,
        }))
    }
}

fn decode_id(object: &Map<String, Value>) -> Result<FeatureId> {
    let text = object
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| ImdfError::feature("missing or non-string 'id'"))?;
    text.parse()
        .map_err(|e| ImdfError::feature(format!("id '{}' is not a UUID: {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Polygon, Polyline};
    use crate::properties::*;
    use crate::types::*;

    fn square() -> Geometry {
        Geometry::Polygon(Polygon::new(vec![
            Point::new(37.0, -122.0),
            Point::new(37.0, -121.999),
            Point::new(37.001, -121.999),
            Point::new(37.001, -122.0),
        ]))
    }

    fn sample_features() -> Vec<Feature> {
        let id = FeatureId::new_random;
        let mut unit = UnitProperties::new(UnitCategory::RestroomFemale);
        unit.name = Some(Labels::single("en", "Restroom"));
        unit.accessibility = Some(vec![Accessibility::Wheelchair]);
        unit.display_point = Some(Point::new(37.0005, -121.9995));

        let mut level = LevelProperties::new(1, Labels::single("en", "Level 1"));
        level.building_ids = Some(vec![id()]);

        vec![
            Feature::new(
                id(),
                AddressProperties::new("1 Main St", "Springfield", "US").with_province("IL"),
                None,
            )
            .unwrap(),
            Feature::new(
                id(),
                AnchorProperties::default(),
                Some(Point::new(37.0, -122.0).into()),
            )
            .unwrap(),
            Feature::new(id(), BuildingProperties::default(), Some(square())).unwrap(),
            Feature::new(
                id(),
                FootprintProperties::new(FootprintCategory::Ground),
                Some(square()),
            )
            .unwrap(),
            Feature::new(id(), level, Some(square())).unwrap(),
            Feature::new(
                id(),
                OpeningProperties::new(OpeningCategory::PedestrianPrincipal),
                Some(
                    Polyline::new(vec![Point::new(37.0, -122.0), Point::new(37.0, -121.9995)])
                        .into(),
                ),
            )
            .unwrap(),
            Feature::new(
                id(),
                RelationshipProperties::new(RelationshipCategory::Traversal, Direction::Directed),
                None,
            )
            .unwrap(),
            Feature::new(id(), unit, Some(square())).unwrap(),
            Feature::new(
                id(),
                VenueProperties::new(VenueCategory::AirportIntl, Labels::single("en", "SFO")),
                Some(square()),
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_every_category_round_trips() {
        let features = sample_features();
        let categories: Vec<_> = features.iter().map(Feature::category).collect();
        for category in FeatureCategory::ALL {
            assert!(categories.contains(&category), "missing {}", category);
        }

        for feature in features {
            let encoded = feature.encode().unwrap();
            let decoded = Feature::decode(feature.category(), &encoded).unwrap();
            assert_eq!(decoded, feature);
            assert_eq!(decoded.encode().unwrap(), encoded);
        }
    }

    #[test]
    fn test_encode_layout() {
        let feature = Feature::new(
            "6F1C3E3A-1111-4222-8333-944455556666".parse().unwrap(),
            AnchorProperties::default(),
            Some(Point::new(1.0, 2.0).into()),
        )
        .unwrap();
        let value = feature.encode().unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["id"], "6f1c3e3a-1111-4222-8333-944455556666");
        assert_eq!(value["feature_type"], "anchor");
        assert_eq!(value["geometry"]["coordinates"], json!([2.0, 1.0]));
        assert_eq!(value["properties"]["unit_id"], Value::Null);
    }

    #[test]
    fn test_category_geometry_rule_enforced() {
        let err = Feature::new(FeatureId::new_random(), AnchorProperties::default(), Some(square()))
            .unwrap_err();
        assert!(matches!(err, ImdfError::MalformedFeatureData(_)));

        let err = Feature::new(
            FeatureId::new_random(),
            UnitProperties::new(UnitCategory::Room),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ImdfError::MalformedFeatureData(_)));

        let address = AddressProperties::new("a", "b", "c");
        assert!(Feature::new(
            FeatureId::new_random(),
            address,
            Some(Point::new(0.0, 0.0).into())
        )
        .is_err());
    }

    #[test]
    fn test_invalid_geometry_rejected_by_constructor() {
        let degenerate = Geometry::Polygon(Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
        ]));
        let err = Feature::new(
            FeatureId::new_random(),
            UnitProperties::new(UnitCategory::Room),
            Some(degenerate),
        )
        .unwrap_err();
        assert!(matches!(err, ImdfError::MalformedGeometry(_)));
    }

    #[test]
    fn test_decode_failures() {
        let good = json!({
            "type": "Feature",
            "id": "6f1c3e3a-1111-4222-8333-944455556666",
            "geometry": {"type": "Point", "coordinates": [2.0, 1.0]},
            "properties": {"address_id": null, "unit_id": null, "comment": null}
        });
        assert!(Feature::decode(FeatureCategory::Anchor, &good).is_ok());

        let mut bad_id = good.clone();
        bad_id["id"] = json!("not-a-uuid");
        assert!(matches!(
            Feature::decode(FeatureCategory::Anchor, &bad_id),
            Err(ImdfError::MalformedFeatureData(_))
        ));

        let mut no_props = good.clone();
        no_props["properties"] = Value::Null;
        assert!(Feature::decode(FeatureCategory::Anchor, &no_props).is_err());

        let mut wrong_type = good.clone();
        wrong_type["feature_type"] = json!("unit");
        assert!(Feature::decode(FeatureCategory::Anchor, &wrong_type).is_err());

        let mut bad_geometry = good.clone();
        bad_geometry["geometry"] = json!({"type": "Point", "coordinates": [2.0]});
        assert!(matches!(
            Feature::decode(FeatureCategory::Anchor, &bad_geometry),
            Err(ImdfError::MalformedGeometry(_))
        ));

        let mut not_feature = good;
        not_feature["type"] = json!("FeatureCollection");
        assert!(Feature::decode(FeatureCategory::Anchor, &not_feature).is_err());
    }

    #[test]
    fn test_unknown_member_rejected() {
        let feature = Feature::new(
            FeatureId::new_random(),
            AnchorProperties::default(),
            Some(Point::new(37.0, -122.0).into()),
        )
        .unwrap();
        let mut record = feature.encode().unwrap();
        record["bbox"] = json!([-122.0, 37.0, -122.0, 37.0]);
        assert!(matches!(
            Feature::decode(FeatureCategory::Anchor, &record),
            Err(ImdfError::MalformedFeatureData(_))
        ));

        // Optional members may be left out
        let mut minimal = feature.encode().unwrap();
        if let Some(object) = minimal.as_object_mut() {
            object.remove("feature_type");
        }
        let decoded = Feature::decode(FeatureCategory::Anchor, &minimal).unwrap();
        assert_eq!(decoded, feature);
    }

    #[test]
    fn test_set_properties_keeps_category() {
        let mut feature = Feature::new(
            FeatureId::new_random(),
            UnitProperties::new(UnitCategory::Unspecified),
            Some(square()),
        )
        .unwrap();
        assert!(feature
            .set_properties(FeatureProperties::Anchor(AnchorProperties::default()))
            .is_err());
        feature
            .set_properties(UnitProperties::new(UnitCategory::Lobby).into())
            .unwrap();
        assert_eq!(
            feature.properties().unit_category(),
            Some(UnitCategory::Lobby)
        );
    }
}
