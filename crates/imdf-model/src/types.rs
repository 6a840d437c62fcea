// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for IMDF data representation
//!
//! Feature identity, the closed set of feature categories and the fixed
//! vocabularies used by the property schemas.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Globally unique feature identifier
///
/// Serialized as a lowercase hyphenated UUID string.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FeatureId(pub Uuid);

impl FeatureId {
    /// Create a random (v4) identifier. Uniqueness against an archive is
    /// checked by the archive, not here.
    pub fn new_random() -> Self {
        FeatureId(Uuid::new_v4())
    }

    /// Borrow the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for FeatureId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(FeatureId)
    }
}

impl From<Uuid> for FeatureId {
    fn from(id: Uuid) -> Self {
        FeatureId(id)
    }
}

impl From<FeatureId> for Uuid {
    fn from(id: FeatureId) -> Self {
        id.0
    }
}

/// Shape family of a geometry value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    Polyline,
    Polygon,
}

impl GeometryKind {
    /// GeoJSON geometry type name
    pub fn geojson_type(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::Polyline => "LineString",
            GeometryKind::Polygon => "Polygon",
        }
    }

    /// Topological dimension (0 for points, 1 for lines, 2 for areas)
    pub fn dimension(&self) -> u8 {
        match self {
            GeometryKind::Point => 0,
            GeometryKind::Polyline => 1,
            GeometryKind::Polygon => 2,
        }
    }

    /// Minimum number of distinct vertices a finished shape needs
    pub fn min_vertices(&self) -> usize {
        match self {
            GeometryKind::Point => 1,
            GeometryKind::Polyline => 2,
            GeometryKind::Polygon => 3,
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.geojson_type())
    }
}

/// Which geometry a feature category may carry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometryRule {
    /// Geometry must be `null`
    Absent,
    /// Geometry of exactly this kind is required
    Required(GeometryKind),
    /// Any geometry kind, or none
    Any,
}

impl GeometryRule {
    /// Check whether a geometry of `kind` (or no geometry) satisfies the rule
    pub fn accepts(&self, kind: Option<GeometryKind>) -> bool {
        match (self, kind) {
            (GeometryRule::Absent, None) => true,
            (GeometryRule::Absent, Some(_)) => false,
            (GeometryRule::Required(required), Some(kind)) => *required == kind,
            (GeometryRule::Required(_), None) => false,
            (GeometryRule::Any, _) => true,
        }
    }
}

/// IMDF feature category
///
/// The closed set of categories this archive understands. Each category is
/// stored in its own `<name>.geojson` file.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FeatureCategory {
    Address,
    Anchor,
    Building,
    Footprint,
    Level,
    Opening,
    Relationship,
    Unit,
    Venue,
}

impl FeatureCategory {
    /// All categories in load/save order
    pub const ALL: [FeatureCategory; 9] = [
        FeatureCategory::Address,
        FeatureCategory::Venue,
        FeatureCategory::Building,
        FeatureCategory::Footprint,
        FeatureCategory::Level,
        FeatureCategory::Unit,
        FeatureCategory::Opening,
        FeatureCategory::Anchor,
        FeatureCategory::Relationship,
    ];

    /// Wire name (also the `feature_type` value)
    pub fn name(&self) -> &'static str {
        match self {
            FeatureCategory::Address => "address",
            FeatureCategory::Anchor => "anchor",
            FeatureCategory::Building => "building",
            FeatureCategory::Footprint => "footprint",
            FeatureCategory::Level => "level",
            FeatureCategory::Opening => "opening",
            FeatureCategory::Relationship => "relationship",
            FeatureCategory::Unit => "unit",
            FeatureCategory::Venue => "venue",
        }
    }

    /// Parse a wire name; unknown names yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        FeatureCategory::ALL.into_iter().find(|c| c.name() == s)
    }

    /// File name of this category inside a dataset directory
    pub fn file_name(&self) -> String {
        format!("{}.geojson", self.name())
    }

    /// Geometry allowed for features of this category
    pub fn geometry_rule(&self) -> GeometryRule {
        match self {
            FeatureCategory::Address => GeometryRule::Absent,
            FeatureCategory::Anchor => GeometryRule::Required(GeometryKind::Point),
            FeatureCategory::Opening => GeometryRule::Required(GeometryKind::Polyline),
            FeatureCategory::Building
            | FeatureCategory::Footprint
            | FeatureCategory::Level
            | FeatureCategory::Unit
            | FeatureCategory::Venue => GeometryRule::Required(GeometryKind::Polygon),
            FeatureCategory::Relationship => GeometryRule::Any,
        }
    }

    /// Categories whose features can be created from a shape of `kind`
    pub fn drawable_with(kind: GeometryKind) -> Vec<FeatureCategory> {
        FeatureCategory::ALL
            .into_iter()
            .filter(|c| c.geometry_rule().accepts(Some(kind)))
            .collect()
    }
}

impl fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declares a closed IMDF vocabulary with exact wire strings.
///
/// Unknown strings fail deserialization; there is no catch-all variant.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $wire:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every value in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire representation
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Parse a wire string
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// Accessibility affordances of a unit or opening
    pub enum Accessibility {
        AssistedListening => "assisted.listening",
        Braille => "braille",
        Hearing => "hearing",
        Hearingloop => "hearingloop",
        Signlanginterpreter => "signlanginterpreter",
        Tactilepaving => "tactilepaving",
        Tdd => "tdd",
        Trs => "trs",
        Volume => "volume",
        Wheelchair => "wheelchair",
    }
}

vocabulary! {
    /// Access restriction
    pub enum Restriction {
        Employeesonly => "employeesonly",
        Restricted => "restricted",
    }
}

vocabulary! {
    /// Venue category
    pub enum VenueCategory {
        Airport => "airport",
        AirportIntl => "airport.intl",
        Aquarium => "aquarium",
        Businesscampus => "businesscampus",
        Casino => "casino",
        Communitycenter => "communitycenter",
        Conventioncenter => "conventioncenter",
        Governmentfacility => "governmentfacility",
        Healthcarefacility => "healthcarefacility",
        Hotel => "hotel",
        Museum => "museum",
        Parkingfacility => "parkingfacility",
        Resort => "resort",
        Retailstore => "retailstore",
        Shoppingcenter => "shoppingcenter",
        Stadium => "stadium",
        Stripmall => "stripmall",
        Theater => "theater",
        Themepark => "themepark",
        Trainstation => "trainstation",
        Transitstation => "transitstation",
        University => "university",
    }
}

vocabulary! {
    /// Unit category
    pub enum UnitCategory {
        Auditorium => "auditorium",
        Brick => "brick",
        Classroom => "classroom",
        Column => "column",
        Concrete => "concrete",
        Conferenceroom => "conferenceroom",
        Drywall => "drywall",
        Elevator => "elevator",
        Escalator => "escalator",
        Fieldofplay => "fieldofplay",
        Firstaid => "firstaid",
        Fitnessroom => "fitnessroom",
        Foodservice => "foodservice",
        Footbridge => "footbridge",
        Glass => "glass",
        Huddleroom => "huddleroom",
        Kitchen => "kitchen",
        Laboratory => "laboratory",
        Library => "library",
        Lobby => "lobby",
        Lounge => "lounge",
        Mailroom => "mailroom",
        Mothersroom => "mothersroom",
        Movietheater => "movietheater",
        Movingwalkway => "movingwalkway",
        Nonpublic => "nonpublic",
        Office => "office",
        Opentobelow => "opentobelow",
        Parking => "parking",
        Phoneroom => "phoneroom",
        Platform => "platform",
        Privatelounge => "privatelounge",
        Ramp => "ramp",
        Recreation => "recreation",
        Restroom => "restroom",
        RestroomFamily => "restroom.family",
        RestroomFemale => "restroom.female",
        RestroomMale => "restroom.male",
        RestroomTransgender => "restroom.transgender",
        RestroomUnisex => "restroom.unisex",
        Road => "road",
        Room => "room",
        Serverroom => "serverroom",
        Shower => "shower",
        Smokingarea => "smokingarea",
        Stairs => "stairs",
        Steps => "steps",
        Storage => "storage",
        Structure => "structure",
        Theater => "theater",
        Unenclosedarea => "unenclosedarea",
        Unspecified => "unspecified",
        Vegetation => "vegetation",
        Waitingroom => "waitingroom",
        Walkway => "walkway",
        WalkwayIsland => "walkway.island",
        Wood => "wood",
    }
}

impl UnitCategory {
    /// Whether a concrete category has been assigned
    pub fn is_specified(&self) -> bool {
        *self != UnitCategory::Unspecified
    }
}

impl Default for UnitCategory {
    fn default() -> Self {
        UnitCategory::Unspecified
    }
}

vocabulary! {
    /// Level category
    pub enum LevelCategory {
        Parking => "parking",
        Transit => "transit",
        Unspecified => "unspecified",
    }
}

vocabulary! {
    /// Building category
    pub enum BuildingCategory {
        Parking => "parking",
        Transit => "transit",
        TransitBus => "transit.bus",
        TransitTrain => "transit.train",
        Unspecified => "unspecified",
    }
}

vocabulary! {
    /// Footprint category
    pub enum FootprintCategory {
        Aerial => "aerial",
        Ground => "ground",
        Subterranean => "subterranean",
    }
}

vocabulary! {
    /// Opening category
    pub enum OpeningCategory {
        Automobile => "automobile",
        Bicycle => "bicycle",
        Emergencyexit => "emergencyexit",
        Pedestrian => "pedestrian",
        PedestrianPrincipal => "pedestrian.principal",
        PedestrianTransit => "pedestrian.transit",
        Service => "service",
    }
}

vocabulary! {
    /// Relationship category
    pub enum RelationshipCategory {
        Elevator => "elevator",
        Escalator => "escalator",
        Ramp => "ramp",
        Stairs => "stairs",
        Traversal => "traversal",
        TraversalPath => "traversal.path",
    }
}

vocabulary! {
    /// Relationship direction
    pub enum Direction {
        Directed => "directed",
        Undirected => "undirected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names_round_trip() {
        for category in FeatureCategory::ALL {
            assert_eq!(FeatureCategory::parse(category.name()), Some(category));
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.name()));
        }
        assert_eq!(FeatureCategory::parse("kiosk"), None);
    }

    #[test]
    fn test_geometry_rules() {
        let anchor = FeatureCategory::Anchor.geometry_rule();
        assert!(anchor.accepts(Some(GeometryKind::Point)));
        assert!(!anchor.accepts(Some(GeometryKind::Polygon)));
        assert!(!anchor.accepts(None));

        assert!(FeatureCategory::Address.geometry_rule().accepts(None));
        assert!(FeatureCategory::Relationship.geometry_rule().accepts(None));
        assert!(FeatureCategory::Relationship
            .geometry_rule()
            .accepts(Some(GeometryKind::Polyline)));
    }

    #[test]
    fn test_drawable_with_polygon() {
        let categories = FeatureCategory::drawable_with(GeometryKind::Polygon);
        assert!(categories.contains(&FeatureCategory::Unit));
        assert!(categories.contains(&FeatureCategory::Venue));
        assert!(!categories.contains(&FeatureCategory::Anchor));
        assert!(!categories.contains(&FeatureCategory::Address));
    }

    #[test]
    fn test_dotted_vocabulary_values() {
        let parsed: UnitCategory = serde_json::from_str("\"restroom.female\"").unwrap();
        assert_eq!(parsed, UnitCategory::RestroomFemale);
        assert_eq!(VenueCategory::AirportIntl.as_str(), "airport.intl");
        assert_eq!(
            serde_json::to_string(&Accessibility::AssistedListening).unwrap(),
            "\"assisted.listening\""
        );
    }

    #[test]
    fn test_unknown_vocabulary_value_is_rejected() {
        let result: std::result::Result<UnitCategory, _> = serde_json::from_str("\"ballroom\"");
        assert!(result.is_err());
        assert_eq!(UnitCategory::parse("ballroom"), None);
    }

    #[test]
    fn test_feature_id_display_is_lowercase() {
        let id: FeatureId = "A1B2C3D4-0000-4000-8000-00000000000F".parse().unwrap();
        assert_eq!(id.to_string(), "a1b2c3d4-0000-4000-8000-00000000000f");
    }
}
