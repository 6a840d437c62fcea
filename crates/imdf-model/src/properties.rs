// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-category property schemas
//!
//! Every schema rejects unknown keys. Absent optional fields decode to `None`
//! and encode as `null`. The wire keeps `""` distinct from `null`; only the
//! editing constructors ([`optional_text`], [`AddressProperties::new`] and
//! its `with_*` setters) turn blank input into `None`.

use crate::error::{ImdfError, Result};
use crate::geometry::{optional_point_object, Point};
use crate::types::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Normalize free-form editor input: blank text becomes `None`
pub fn optional_text(text: impl AsRef<str>) -> Option<String> {
    let trimmed = text.as_ref().trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Localized names keyed by language tag
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(pub BTreeMap<String, String>);

impl Labels {
    /// Labels with a single language entry
    pub fn single(language: impl Into<String>, text: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(language.into(), text.into());
        Labels(map)
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    pub fn insert(&mut self, language: impl Into<String>, text: impl Into<String>) {
        self.0.insert(language.into(), text.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// English label if present, else the first one in tag order
    pub fn preferred(&self) -> Option<&str> {
        self.get("en")
            .or_else(|| self.0.values().next().map(String::as_str))
    }
}

/// Typed pointer to another feature (used by relationships)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureReference {
    pub id: FeatureId,
    pub feature_type: FeatureCategory,
}

impl FeatureReference {
    pub fn new(id: FeatureId, feature_type: FeatureCategory) -> Self {
        Self { id, feature_type }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddressProperties {
    pub address: String,
    pub unit: Option<String>,
    pub locality: String,
    pub province: Option<String>,
    pub country: String,
    pub postal_code: Option<String>,
    pub postal_code_ext: Option<String>,
    pub postal_code_vanity: Option<String>,
    pub comment: Option<String>,
}

impl AddressProperties {
    /// Build an address from editor input
    pub fn new(
        address: impl Into<String>,
        locality: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            unit: None,
            locality: locality.into(),
            province: None,
            country: country.into(),
            postal_code: None,
            postal_code_ext: None,
            postal_code_vanity: None,
            comment: None,
        }
    }

    pub fn with_unit(mut self, unit: impl AsRef<str>) -> Self {
        self.unit = optional_text(unit);
        self
    }

    pub fn with_province(mut self, province: impl AsRef<str>) -> Self {
        self.province = optional_text(province);
        self
    }

    pub fn with_postal_code(mut self, postal_code: impl AsRef<str>) -> Self {
        self.postal_code = optional_text(postal_code);
        self
    }

    pub fn with_postal_code_ext(mut self, ext: impl AsRef<str>) -> Self {
        self.postal_code_ext = optional_text(ext);
        self
    }

    pub fn with_postal_code_vanity(mut self, vanity: impl AsRef<str>) -> Self {
        self.postal_code_vanity = optional_text(vanity);
        self
    }

    pub fn with_comment(mut self, comment: impl AsRef<str>) -> Self {
        self.comment = optional_text(comment);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnchorProperties {
    pub address_id: Option<FeatureId>,
    pub unit_id: Option<FeatureId>,
    pub comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildingProperties {
    pub name: Option<Labels>,
    pub alt_name: Option<Labels>,
    pub category: BuildingCategory,
    pub restriction: Option<Restriction>,
    #[serde(default, with = "optional_point_object")]
    pub display_point: Option<Point>,
    pub address_id: Option<FeatureId>,
    pub comment: Option<String>,
}

impl Default for BuildingProperties {
    fn default() -> Self {
        Self {
            name: None,
            alt_name: None,
            category: BuildingCategory::Unspecified,
            restriction: None,
            display_point: None,
            address_id: None,
            comment: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FootprintProperties {
    pub category: FootprintCategory,
    pub name: Option<Labels>,
    pub building_ids: Vec<FeatureId>,
    pub comment: Option<String>,
}

impl FootprintProperties {
    pub fn new(category: FootprintCategory) -> Self {
        Self {
            category,
            name: None,
            building_ids: Vec::new(),
            comment: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelProperties {
    pub category: LevelCategory,
    pub restriction: Option<Restriction>,
    pub outdoor: bool,
    pub ordinal: i32,
    pub name: Labels,
    pub short_name: Option<Labels>,
    #[serde(default, with = "optional_point_object")]
    pub display_point: Option<Point>,
    pub address_id: Option<FeatureId>,
    pub building_ids: Option<Vec<FeatureId>>,
    pub comment: Option<String>,
}

impl LevelProperties {
    pub fn new(ordinal: i32, name: Labels) -> Self {
        Self {
            category: LevelCategory::Unspecified,
            restriction: None,
            outdoor: false,
            ordinal,
            name,
            short_name: None,
            display_point: None,
            address_id: None,
            building_ids: None,
            comment: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpeningProperties {
    pub category: OpeningCategory,
    pub accessibility: Option<Vec<Accessibility>>,
    pub name: Option<Labels>,
    pub alt_name: Option<Labels>,
    #[serde(default, with = "optional_point_object")]
    pub display_point: Option<Point>,
    pub level_id: Option<FeatureId>,
    pub comment: Option<String>,
}

impl OpeningProperties {
    pub fn new(category: OpeningCategory) -> Self {
        Self {
            category,
            accessibility: None,
            name: None,
            alt_name: None,
            display_point: None,
            level_id: None,
            comment: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationshipProperties {
    pub category: RelationshipCategory,
    pub direction: Direction,
    pub origin: Option<FeatureReference>,
    pub destination: Option<FeatureReference>,
    pub intermediary: Option<Vec<FeatureReference>>,
    pub hours: Option<String>,
    pub comment: Option<String>,
}

impl RelationshipProperties {
    pub fn new(category: RelationshipCategory, direction: Direction) -> Self {
        Self {
            category,
            direction,
            origin: None,
            destination: None,
            intermediary: None,
            hours: None,
            comment: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitProperties {
    pub category: UnitCategory,
    pub restriction: Option<Restriction>,
    pub accessibility: Option<Vec<Accessibility>>,
    pub name: Option<Labels>,
    pub alt_name: Option<Labels>,
    #[serde(default, with = "optional_point_object")]
    pub display_point: Option<Point>,
    pub level_id: Option<FeatureId>,
    pub comment: Option<String>,
}

impl UnitProperties {
    pub fn new(category: UnitCategory) -> Self {
        Self {
            category,
            restriction: None,
            accessibility: None,
            name: None,
            alt_name: None,
            display_point: None,
            level_id: None,
            comment: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VenueProperties {
    pub category: VenueCategory,
    pub restriction: Option<Restriction>,
    pub name: Labels,
    pub alt_name: Option<Labels>,
    pub hours: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    #[serde(default, with = "optional_point_object")]
    pub display_point: Option<Point>,
    pub address_id: Option<FeatureId>,
    pub comment: Option<String>,
}

impl VenueProperties {
    pub fn new(category: VenueCategory, name: Labels) -> Self {
        Self {
            category,
            restriction: None,
            name,
            alt_name: None,
            hours: None,
            phone: None,
            website: None,
            display_point: None,
            address_id: None,
            comment: None,
        }
    }
}

/// Properties of a feature, one variant per category
///
/// The variant decides the feature's category, so schema and category can
/// never disagree.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureProperties {
    Address(AddressProperties),
    Anchor(AnchorProperties),
    Building(BuildingProperties),
    Footprint(FootprintProperties),
    Level(LevelProperties),
    Opening(OpeningProperties),
    Relationship(RelationshipProperties),
    Unit(UnitProperties),
    Venue(VenueProperties),
}

fn decode_schema<T: serde::de::DeserializeOwned>(
    category: FeatureCategory,
    raw: &Value,
) -> Result<T> {
    T::deserialize(raw)
        .map_err(|e| ImdfError::feature(format!("invalid {} properties: {}", category, e)))
}

impl FeatureProperties {
    pub fn category(&self) -> FeatureCategory {
        match self {
            FeatureProperties::Address(_) => FeatureCategory::Address,
            FeatureProperties::Anchor(_) => FeatureCategory::Anchor,
            FeatureProperties::Building(_) => FeatureCategory::Building,
            FeatureProperties::Footprint(_) => FeatureCategory::Footprint,
            FeatureProperties::Level(_) => FeatureCategory::Level,
            FeatureProperties::Opening(_) => FeatureCategory::Opening,
            FeatureProperties::Relationship(_) => FeatureCategory::Relationship,
            FeatureProperties::Unit(_) => FeatureCategory::Unit,
            FeatureProperties::Venue(_) => FeatureCategory::Venue,
        }
    }

    /// Decode the `properties` member of a `category` feature
    pub fn decode(category: FeatureCategory, raw: &Value) -> Result<Self> {
        if !raw.is_object() {
            return Err(ImdfError::feature(format!(
                "{} properties must be an object",
                category
            )));
        }
        Ok(match category {
            FeatureCategory::Address => FeatureProperties::Address(decode_schema(category, raw)?),
            FeatureCategory::Anchor => FeatureProperties::Anchor(decode_schema(category, raw)?),
            FeatureCategory::Building => {
                FeatureProperties::Building(decode_schema(category, raw)?)
            }
            FeatureCategory::Footprint => {
                FeatureProperties::Footprint(decode_schema(category, raw)?)
            }
            FeatureCategory::Level => FeatureProperties::Level(decode_schema(category, raw)?),
            FeatureCategory::Opening => FeatureProperties::Opening(decode_schema(category, raw)?),
            FeatureCategory::Relationship => {
                FeatureProperties::Relationship(decode_schema(category, raw)?)
            }
            FeatureCategory::Unit => FeatureProperties::Unit(decode_schema(category, raw)?),
            FeatureCategory::Venue => FeatureProperties::Venue(decode_schema(category, raw)?),
        })
    }

    /// Encode as the `properties` JSON object
    pub fn encode(&self) -> Result<Value> {
        let value = match self {
            FeatureProperties::Address(p) => serde_json::to_value(p),
            FeatureProperties::Anchor(p) => serde_json::to_value(p),
            FeatureProperties::Building(p) => serde_json::to_value(p),
            FeatureProperties::Footprint(p) => serde_json::to_value(p),
            FeatureProperties::Level(p) => serde_json::to_value(p),
            FeatureProperties::Opening(p) => serde_json::to_value(p),
            FeatureProperties::Relationship(p) => serde_json::to_value(p),
            FeatureProperties::Unit(p) => serde_json::to_value(p),
            FeatureProperties::Venue(p) => serde_json::to_value(p),
        }?;
        Ok(value)
    }

    /// Human-readable name, if the schema has one
    pub fn display_name(&self) -> Option<&str> {
        match self {
            FeatureProperties::Address(p) => Some(p.address.as_str()),
            FeatureProperties::Building(p) => p.name.as_ref().and_then(Labels::preferred),
            FeatureProperties::Footprint(p) => p.name.as_ref().and_then(Labels::preferred),
            FeatureProperties::Level(p) => p.name.preferred(),
            FeatureProperties::Opening(p) => p.name.as_ref().and_then(Labels::preferred),
            FeatureProperties::Unit(p) => p.name.as_ref().and_then(Labels::preferred),
            FeatureProperties::Venue(p) => p.name.preferred(),
            FeatureProperties::Anchor(_) | FeatureProperties::Relationship(_) => None,
        }
    }

    /// Unit category, for units only
    pub fn unit_category(&self) -> Option<UnitCategory> {
        match self {
            FeatureProperties::Unit(p) => Some(p.category),
            _ => None,
        }
    }

    /// Ids of other features this one points at
    pub fn referenced_ids(&self) -> Vec<FeatureId> {
        match self {
            FeatureProperties::Address(_) => Vec::new(),
            FeatureProperties::Anchor(p) => p.address_id.into_iter().chain(p.unit_id).collect(),
            FeatureProperties::Building(p) => p.address_id.into_iter().collect(),
            FeatureProperties::Footprint(p) => p.building_ids.clone(),
            FeatureProperties::Level(p) => p
                .address_id
                .into_iter()
                .chain(p.building_ids.iter().flatten().copied())
                .collect(),
            FeatureProperties::Opening(p) => p.level_id.into_iter().collect(),
            FeatureProperties::Relationship(p) => p
                .origin
                .iter()
                .chain(p.destination.iter())
                .chain(p.intermediary.iter().flatten())
                .map(|r| r.id)
                .collect(),
            FeatureProperties::Unit(p) => p.level_id.into_iter().collect(),
            FeatureProperties::Venue(p) => p.address_id.into_iter().collect(),
        }
    }
}

macro_rules! impl_from_properties {
    ($($variant:ident($schema:ty)),+ $(,)?) => {
        $(
            impl From<$schema> for FeatureProperties {
                fn from(p: $schema) -> Self {
                    FeatureProperties::$variant(p)
                }
            }
        )+
    };
}

impl_from_properties!(
    Address(AddressProperties),
    Anchor(AnchorProperties),
    Building(BuildingProperties),
    Footprint(FootprintProperties),
    Level(LevelProperties),
    Opening(OpeningProperties),
    Relationship(RelationshipProperties),
    Unit(UnitProperties),
    Venue(VenueProperties),
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_text_normalizes_blank_input() {
        assert_eq!(optional_text(""), None);
        assert_eq!(optional_text("   "), None);
        assert_eq!(optional_text(" Suite 4 "), Some("Suite 4".to_string()));
    }

    #[test]
    fn test_address_constructor_drops_empty_fields() {
        let address = AddressProperties::new("1 Infinite Loop", "Cupertino", "US")
            .with_unit("")
            .with_province("CA")
            .with_postal_code("95014")
            .with_postal_code_ext(" ");
        assert_eq!(address.unit, None);
        assert_eq!(address.province.as_deref(), Some("CA"));
        assert_eq!(address.postal_code_ext, None);
    }

    #[test]
    fn test_wire_keeps_empty_string_distinct_from_null() {
        let raw = json!({
            "address": "1 Main St",
            "unit": "",
            "locality": "Springfield",
            "province": null,
            "country": "US",
            "postal_code": null,
            "postal_code_ext": null,
            "postal_code_vanity": null,
            "comment": null
        });
        let decoded = FeatureProperties::decode(FeatureCategory::Address, &raw).unwrap();
        match &decoded {
            FeatureProperties::Address(a) => {
                assert_eq!(a.unit.as_deref(), Some(""));
                assert_eq!(a.province, None);
            }
            other => panic!("unexpected variant {:?}", other),
        }
        assert_eq!(decoded.encode().unwrap(), raw);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let raw = json!({"category": "room", "colour": "red"});
        let err = FeatureProperties::decode(FeatureCategory::Unit, &raw).unwrap_err();
        assert!(matches!(err, ImdfError::MalformedFeatureData(_)));
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let raw = json!({"category": "unspecified", "ordinal": 0, "outdoor": false});
        assert!(FeatureProperties::decode(FeatureCategory::Level, &raw).is_err());
    }

    #[test]
    fn test_vocabulary_outside_range_is_rejected() {
        let raw = json!({"category": "ballroom"});
        assert!(FeatureProperties::decode(FeatureCategory::Unit, &raw).is_err());
    }

    #[test]
    fn test_display_point_is_point_object() {
        let mut unit = UnitProperties::new(UnitCategory::Office);
        unit.display_point = Some(Point::new(37.0, -122.0));
        let value = FeatureProperties::Unit(unit.clone()).encode().unwrap();
        assert_eq!(
            value["display_point"],
            json!({"type": "Point", "coordinates": [-122.0, 37.0]})
        );

        let decoded = FeatureProperties::decode(FeatureCategory::Unit, &value).unwrap();
        assert_eq!(decoded, FeatureProperties::Unit(unit));
    }

    #[test]
    fn test_display_point_must_be_point() {
        let raw = json!({
            "category": "room",
            "display_point": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}
        });
        assert!(FeatureProperties::decode(FeatureCategory::Unit, &raw).is_err());
    }

    #[test]
    fn test_relationship_references() {
        let origin = FeatureId::new_random();
        let destination = FeatureId::new_random();
        let mut rel = RelationshipProperties::new(RelationshipCategory::Stairs, Direction::Undirected);
        rel.origin = Some(FeatureReference::new(origin, FeatureCategory::Unit));
        rel.destination = Some(FeatureReference::new(destination, FeatureCategory::Unit));

        let props = FeatureProperties::from(rel);
        assert_eq!(props.category(), FeatureCategory::Relationship);
        assert_eq!(props.referenced_ids(), vec![origin, destination]);

        let value = props.encode().unwrap();
        assert_eq!(value["origin"]["feature_type"], json!("unit"));
    }

    #[test]
    fn test_display_name_prefers_english() {
        let mut name = Labels::single("fr", "Hall");
        name.insert("en", "Lobby");
        let venue = VenueProperties::new(VenueCategory::Museum, name);
        assert_eq!(FeatureProperties::Venue(venue).display_name(), Some("Lobby"));
    }
}
