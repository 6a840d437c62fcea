// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Archive - the in-memory feature store of one dataset directory

use crate::io::{read_text, write_atomic};
use imdf_model::{
    BoundingRegion, Feature, FeatureCategory, FeatureId, FeatureProperties, Geometry, ImdfError,
    Result,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// All features of a dataset, grouped by category
///
/// Invariant: no two features share an id, across every category. Each
/// category keeps insertion order.
#[derive(Debug, Clone)]
pub struct Archive {
    root: PathBuf,
    collections: FxHashMap<FeatureCategory, Vec<Feature>>,
    /// Id to owning category
    index: FxHashMap<FeatureId, FeatureCategory>,
    dirty: FxHashSet<FeatureCategory>,
}

impl Archive {
    /// Empty archive bound to `root`; nothing is written until [`save`](Self::save)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            collections: FxHashMap::default(),
            index: FxHashMap::default(),
            dirty: FxHashSet::default(),
        }
    }

    /// Load every category file under `root`
    ///
    /// Missing files are empty categories. The first failure aborts the whole
    /// load with [`ImdfError::ArchiveLoad`]; no partial archive is returned.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let mut archive = Archive::new(root);

        for category in FeatureCategory::ALL {
            let path = archive.path_for(category);
            if !path.exists() {
                log::debug!("No {} file, starting empty", category.file_name());
                continue;
            }
            archive
                .load_category(category, &path)
                .map_err(|e| ImdfError::load(category, e))?;
        }

        log::info!(
            "Loaded {} features from {}",
            archive.len(),
            archive.root.display()
        );
        Ok(archive)
    }

    fn load_category(&mut self, category: FeatureCategory, path: &Path) -> Result<()> {
        let text = read_text(path)?;
        let collection: Value = serde_json::from_str(&text)?;

        let object = collection
            .as_object()
            .filter(|o| o.get("type").and_then(Value::as_str) == Some("FeatureCollection"))
            .ok_or_else(|| ImdfError::feature("file is not a GeoJSON FeatureCollection"))?;
        let records = object
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| ImdfError::feature("FeatureCollection has no 'features' array"))?;

        for record in records {
            let feature = Feature::decode(category, record)?;
            self.insert(feature)?;
        }
        log::debug!("Decoded {} {} features", records.len(), category);
        Ok(())
    }

    fn insert(&mut self, feature: Feature) -> Result<()> {
        let id = feature.id();
        if self.index.contains_key(&id) {
            return Err(ImdfError::DuplicateIdentifier(id));
        }
        let category = feature.category();
        self.index.insert(id, category);
        self.collections.entry(category).or_default().push(feature);
        Ok(())
    }

    /// Dataset directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `category`
    pub fn path_for(&self, category: FeatureCategory) -> PathBuf {
        self.root.join(category.file_name())
    }

    /// Write one category, or every category when `None`
    ///
    /// Each file is written to a temporary sibling and renamed into place.
    pub fn save(&mut self, category: Option<FeatureCategory>) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| ImdfError::io(&self.root, e))?;

        let categories: Vec<FeatureCategory> = match category {
            Some(c) => vec![c],
            None => FeatureCategory::ALL.to_vec(),
        };
        for category in categories {
            self.save_category(category)?;
        }
        Ok(())
    }

    /// Write only the categories changed since the last save or load
    pub fn save_dirty(&mut self) -> Result<()> {
        for category in self.dirty_categories() {
            self.save(Some(category))?;
        }
        Ok(())
    }

    fn save_category(&mut self, category: FeatureCategory) -> Result<()> {
        let records = self
            .features(category)
            .iter()
            .map(Feature::encode)
            .collect::<Result<Vec<_>>>()?;
        let count = records.len();
        let collection = json!({
            "type": "FeatureCollection",
            "features": records,
        });
        let bytes = serde_json::to_vec_pretty(&collection)?;
        write_atomic(&self.path_for(category), &bytes)?;
        self.dirty.remove(&category);
        log::info!("Saved {} {} features", count, category);
        Ok(())
    }

    /// Add a new feature; its id must be unused across the archive
    pub fn add_feature(&mut self, feature: Feature) -> Result<()> {
        let category = feature.category();
        let id = feature.id();
        self.insert(feature)?;
        self.dirty.insert(category);
        log::debug!("Added {} {}", category, id);
        Ok(())
    }

    /// Remove a feature from whichever category holds it
    pub fn remove_feature(&mut self, id: FeatureId) -> Option<Feature> {
        let category = self.index.remove(&id)?;
        let features = self.collections.get_mut(&category)?;
        let position = features.iter().position(|f| f.id() == id)?;
        self.dirty.insert(category);
        log::debug!("Removed {} {}", category, id);
        Some(features.remove(position))
    }

    /// Random id not used by any live feature
    pub fn generate_unused_id(&self) -> FeatureId {
        loop {
            let id = FeatureId::new_random();
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn find(&self, id: FeatureId) -> Option<&Feature> {
        let category = self.index.get(&id)?;
        self.collections
            .get(category)?
            .iter()
            .find(|f| f.id() == id)
    }

    fn find_mut(&mut self, id: FeatureId) -> Result<&mut Feature> {
        let category = *self
            .index
            .get(&id)
            .ok_or(ImdfError::FeatureNotFound(id))?;
        self.collections
            .get_mut(&category)
            .and_then(|features| features.iter_mut().find(|f| f.id() == id))
            .ok_or(ImdfError::FeatureNotFound(id))
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.index.contains_key(&id)
    }

    /// Replace a feature's geometry, checked against its category rule
    pub fn update_geometry(&mut self, id: FeatureId, geometry: Option<Geometry>) -> Result<()> {
        let feature = self.find_mut(id)?;
        feature.set_geometry(geometry)?;
        let category = feature.category();
        self.dirty.insert(category);
        Ok(())
    }

    /// Replace a feature's properties; the category cannot change
    pub fn update_properties(&mut self, id: FeatureId, properties: FeatureProperties) -> Result<()> {
        let feature = self.find_mut(id)?;
        feature.set_properties(properties)?;
        let category = feature.category();
        self.dirty.insert(category);
        Ok(())
    }

    /// Features of one category in insertion order
    pub fn features(&self, category: FeatureCategory) -> &[Feature] {
        self.collections
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every feature, category by category
    pub fn iter(&self) -> impl Iterator<Item = &Feature> + '_ {
        FeatureCategory::ALL
            .into_iter()
            .flat_map(move |c| self.features(c).iter())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn dirty_categories(&self) -> Vec<FeatureCategory> {
        FeatureCategory::ALL
            .into_iter()
            .filter(|c| self.dirty.contains(c))
            .collect()
    }

    /// Bounds of every feature geometry
    pub fn bounding_region(&self) -> Option<BoundingRegion> {
        self.iter()
            .filter_map(|f| f.geometry())
            .filter_map(Geometry::bounding_region)
            .reduce(|a, b| a.merge(&b))
    }

    pub fn category_counts(&self) -> Vec<(FeatureCategory, usize)> {
        FeatureCategory::ALL
            .into_iter()
            .map(|c| (c, self.features(c).len()))
            .collect()
    }

    /// `(feature, missing target)` pairs for references to ids not in the archive
    pub fn dangling_references(&self) -> Vec<(FeatureId, FeatureId)> {
        self.iter()
            .flat_map(move |f| {
                f.properties()
                    .referenced_ids()
                    .into_iter()
                    .filter(move |target| !self.contains(*target))
                    .map(move |target| (f.id(), target))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imdf_model::{AnchorProperties, Point, Polygon, UnitCategory, UnitProperties};

    fn anchor(id: FeatureId) -> Feature {
        Feature::new(
            id,
            AnchorProperties::default(),
            Some(Point::new(1.0, 1.0).into()),
        )
        .unwrap()
    }

    fn unit(id: FeatureId) -> Feature {
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 2.0),
            Point::new(2.0, 2.0),
        ];
        Feature::new(
            id,
            UnitProperties::new(UnitCategory::Room),
            Some(Polygon::new(ring).into()),
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_id_rejected_across_categories() {
        let mut archive = Archive::new("/tmp/unused");
        let id = archive.generate_unused_id();
        archive.add_feature(anchor(id)).unwrap();

        let err = archive.add_feature(unit(id)).unwrap_err();
        assert!(matches!(err, ImdfError::DuplicateIdentifier(dup) if dup == id));
        assert_eq!(archive.len(), 1);
        assert!(archive.features(FeatureCategory::Unit).is_empty());
    }

    #[test]
    fn test_generated_ids_are_unique_and_unused() {
        let mut archive = Archive::new("/tmp/unused");
        for _ in 0..10 {
            let id = archive.generate_unused_id();
            archive.add_feature(anchor(id)).unwrap();
        }
        let existing: FxHashSet<_> = archive.iter().map(Feature::id).collect();
        let generated: FxHashSet<_> = (0..100).map(|_| archive.generate_unused_id()).collect();
        assert_eq!(generated.len(), 100);
        assert!(generated.is_disjoint(&existing));
    }

    #[test]
    fn test_remove_feature() {
        let mut archive = Archive::new("/tmp/unused");
        let a = archive.generate_unused_id();
        let b = archive.generate_unused_id();
        archive.add_feature(anchor(a)).unwrap();
        archive.add_feature(anchor(b)).unwrap();

        let removed = archive.remove_feature(a).unwrap();
        assert_eq!(removed.id(), a);
        assert!(archive.find(a).is_none());
        assert_eq!(archive.features(FeatureCategory::Anchor)[0].id(), b);
        assert!(archive.remove_feature(a).is_none());
    }

    #[test]
    fn test_update_geometry_marks_dirty() {
        let mut archive = Archive::new("/tmp/unused");
        let id = archive.generate_unused_id();
        archive.add_feature(anchor(id)).unwrap();
        archive.dirty.clear();

        archive
            .update_geometry(id, Some(Point::new(2.0, 3.0).into()))
            .unwrap();
        assert_eq!(archive.dirty_categories(), vec![FeatureCategory::Anchor]);
        assert_eq!(
            archive.find(id).unwrap().geometry(),
            Some(&Geometry::Point(Point::new(2.0, 3.0)))
        );

        // Anchors cannot become polygons
        let square = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
        ]);
        assert!(archive.update_geometry(id, Some(square.into())).is_err());

        let missing = FeatureId::new_random();
        assert!(matches!(
            archive.update_geometry(missing, None),
            Err(ImdfError::FeatureNotFound(_))
        ));
    }

    #[test]
    fn test_bounding_region_and_counts() {
        let mut archive = Archive::new("/tmp/unused");
        assert!(archive.bounding_region().is_none());
        archive.add_feature(anchor(archive.generate_unused_id())).unwrap();
        archive.add_feature(unit(archive.generate_unused_id())).unwrap();

        let region = archive.bounding_region().unwrap();
        assert_eq!(region.max_latitude, 2.0);
        assert_eq!(region.min_longitude, 0.0);

        let counts = archive.category_counts();
        assert!(counts.contains(&(FeatureCategory::Unit, 1)));
        assert!(counts.contains(&(FeatureCategory::Venue, 0)));
    }

    #[test]
    fn test_dangling_references() {
        let mut archive = Archive::new("/tmp/unused");
        let unit_id = archive.generate_unused_id();
        archive.add_feature(unit(unit_id)).unwrap();

        let missing = FeatureId::new_random();
        let props = AnchorProperties {
            address_id: Some(missing),
            unit_id: Some(unit_id),
            comment: None,
        };
        let anchor_id = archive.generate_unused_id();
        let feature = Feature::new(anchor_id, props, Some(Point::new(1.0, 1.0).into())).unwrap();
        archive.add_feature(feature).unwrap();

        assert_eq!(archive.dangling_references(), vec![(anchor_id, missing)]);
    }
}
