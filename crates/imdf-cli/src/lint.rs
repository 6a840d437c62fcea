// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dataset checks that go beyond what loading already enforces

use imdf_archive::Archive;
use imdf_geometry::{check_hole_containment, Error as GeometryError};
use imdf_model::{FeatureCategory, FeatureId, Geometry};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Finding {
    HoleOutside {
        category: FeatureCategory,
        id: FeatureId,
        hole: usize,
    },
    DanglingReference {
        from: FeatureId,
        to: FeatureId,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::HoleOutside { category, id, hole } => {
                write!(f, "{} {}: hole {} leaves the exterior ring", category, id, hole)
            }
            Finding::DanglingReference { from, to } => {
                write!(f, "{} references missing feature {}", from, to)
            }
        }
    }
}

pub fn lint(archive: &Archive) -> Vec<Finding> {
    let mut findings = Vec::new();

    for feature in archive.iter() {
        let Some(Geometry::Polygon(polygon)) = feature.geometry() else {
            continue;
        };
        if let Err(GeometryError::HoleOutsideExterior { index }) = check_hole_containment(polygon)
        {
            findings.push(Finding::HoleOutside {
                category: feature.category(),
                id: feature.id(),
                hole: index,
            });
        }
    }

    findings.extend(
        archive
            .dangling_references()
            .into_iter()
            .map(|(from, to)| Finding::DanglingReference { from, to }),
    );
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use imdf_model::{Feature, Point, Polygon, UnitCategory, UnitProperties};

    fn square(min: f64, max: f64) -> Vec<Point> {
        vec![
            Point::new(min, min),
            Point::new(min, max),
            Point::new(max, max),
            Point::new(max, min),
        ]
    }

    #[test]
    fn clean_dataset_has_no_findings() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = Archive::new(dir.path());
        archive
            .add_feature(
                Feature::new(
                    FeatureId::new_random(),
                    UnitProperties::new(UnitCategory::Room),
                    Some(Polygon::new(square(0.0, 0.001)).into()),
                )
                .unwrap(),
            )
            .unwrap();
        assert!(lint(&archive).is_empty());
    }

    #[test]
    fn reports_escaping_hole_and_missing_level() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = Archive::new(dir.path());

        let mut polygon = Polygon::new(square(0.0, 0.001));
        polygon.holes.push(square(0.0005, 0.002));
        let missing_level = FeatureId::new_random();
        let mut properties = UnitProperties::new(UnitCategory::Room);
        properties.level_id = Some(missing_level);
        let unit = Feature::new(FeatureId::new_random(), properties, Some(polygon.into())).unwrap();
        let unit_id = unit.id();
        archive.add_feature(unit).unwrap();

        let findings = lint(&archive);
        assert_eq!(findings.len(), 2);
        assert!(findings.contains(&Finding::HoleOutside {
            category: FeatureCategory::Unit,
            id: unit_id,
            hole: 0,
        }));
        assert!(findings.contains(&Finding::DanglingReference {
            from: unit_id,
            to: missing_level,
        }));
    }
}
