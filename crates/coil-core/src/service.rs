// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::canonical::Canonicalizer;
use crate::config::GeoConfig;
use crate::geojson::GeoFeature;
use crate::geometry::{self, BoundingBox};
use crate::grouping::MacroGrouper;
use crate::resolver::RegionResolver;
use crate::store::GeoStore;
use crate::Country;
use serde::Serialize;

/// Owned summary of one display group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub label: String,
    pub members: Vec<String>,
    pub bbox: Option<BoundingBox>,
}

/// Entry point for region lookups. Every query degrades to `None` when a
/// country's boundary data cannot be loaded.
pub struct GeoRegionService {
    store: GeoStore,
    grouper: MacroGrouper,
}

impl GeoRegionService {
    pub fn new(store: GeoStore, grouper: MacroGrouper) -> Self {
        Self { store, grouper }
    }

    pub fn from_config(config: &GeoConfig) -> Self {
        Self::new(GeoStore::from_dir(&config.data_dir), MacroGrouper::default())
    }

    pub fn store(&self) -> &GeoStore {
        &self.store
    }

    fn canonicalizer(&self) -> &Canonicalizer {
        self.grouper.canonicalizer()
    }

    pub fn canonicalize(&self, country: Country, name: &str) -> String {
        self.canonicalizer().canonicalize(country, name)
    }

    pub fn find_region(&self, country: Country, name: &str) -> Option<GeoFeature> {
        let collection = self.store.load(country)?;
        RegionResolver::new(self.canonicalizer())
            .find(&collection, country, name)
            .cloned()
    }

    pub fn locate(&self, country: Country, lng: f64, lat: f64) -> Option<GeoFeature> {
        let collection = self.store.load(country)?;
        RegionResolver::new(self.canonicalizer())
            .locate(&collection, lng, lat)
            .cloned()
    }

    pub fn region_bbox(&self, country: Country, name: &str) -> Option<BoundingBox> {
        let collection = self.store.load(country)?;
        let feature = RegionResolver::new(self.canonicalizer()).find(&collection, country, name)?;
        geometry::bbox(&feature.geometry)
    }

    pub fn group_of(&self, country: Country, name: &str) -> Option<String> {
        self.grouper.group_of(country, name).map(str::to_string)
    }

    /// Display groups of the loaded collection. Empty when no data is available.
    pub fn groups(&self, country: Country) -> Vec<GroupSummary> {
        let Some(collection) = self.store.load(country) else {
            return Vec::new();
        };
        let groups = self.grouper.group_features(country, &collection);
        groups
            .into_iter()
            .map(|group| GroupSummary {
                label: group.label,
                members: group
                    .features
                    .iter()
                    .filter_map(|f| f.display_name())
                    .collect(),
                bbox: group.bbox,
            })
            .collect()
    }

    /// Features belonging to a group label, falling back to a single region
    /// lookup when the label is not a group.
    ///
    /// Some labels are also province names ("Papua", "Maluku"). When the
    /// collection has a feature whose canonical name equals the selection,
    /// that single province is selected instead of its group.
    pub fn select(&self, country: Country, selection: &str) -> Vec<GeoFeature> {
        let members = self.grouper.expand(country, selection);
        if members.is_empty() {
            return self.find_region(country, selection).into_iter().collect();
        }
        let Some(collection) = self.store.load(country) else {
            return Vec::new();
        };

        let key = self.canonicalize(country, selection);
        if members.contains(&key.as_str()) {
            let exact = collection.features.iter().find(|f| {
                f.display_name()
                    .is_some_and(|name| self.canonicalize(country, &name) == key)
            });
            if let Some(feature) = exact {
                log::debug!("Selection is a unit, not its group — country={} unit={}", country, key);
                return vec![feature.clone()];
            }
        }

        collection
            .features
            .iter()
            .filter(|f| {
                f.display_name()
                    .map(|name| self.canonicalize(country, &name))
                    .is_some_and(|key| members.contains(&key.as_str()))
            })
            .cloned()
            .collect()
    }
}
