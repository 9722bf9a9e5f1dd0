// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::canonical::Canonicalizer;
use crate::geojson::{GeoCollection, GeoFeature};
use crate::geometry;
use crate::Country;

/// Name and point lookups over one country's boundary collection.
///
/// Matching is order dependent: when several features qualify, the first in
/// collection order wins. Collections are expected to carry unique names.
pub struct RegionResolver<'a> {
    canonicalizer: &'a Canonicalizer,
}

impl<'a> RegionResolver<'a> {
    pub fn new(canonicalizer: &'a Canonicalizer) -> Self {
        Self { canonicalizer }
    }

    fn feature_key(&self, country: Country, feature: &GeoFeature) -> String {
        feature
            .display_name()
            .map(|name| self.canonicalizer.canonicalize(country, &name))
            .unwrap_or_default()
    }

    /// Exact canonical match first, then the first feature whose canonical
    /// name contains the query.
    pub fn find<'c>(
        &self,
        collection: &'c GeoCollection,
        country: Country,
        name: &str,
    ) -> Option<&'c GeoFeature> {
        let target = self.canonicalizer.canonicalize(country, name);
        if target.is_empty() {
            return None;
        }

        let keys: Vec<String> = collection
            .features
            .iter()
            .map(|f| self.feature_key(country, f))
            .collect();

        // 1. Exact
        if let Some(i) = keys.iter().position(|k| *k == target) {
            return Some(&collection.features[i]);
        }
        // 2. Substring
        keys.iter()
            .position(|k| !k.is_empty() && k.contains(&target))
            .map(|i| &collection.features[i])
    }

    /// First feature whose geometry contains `(lng, lat)`.
    pub fn locate<'c>(
        &self,
        collection: &'c GeoCollection,
        lng: f64,
        lat: f64,
    ) -> Option<&'c GeoFeature> {
        collection.features.iter().find(|f| {
            geometry::bbox(&f.geometry).is_some_and(|b| b.contains(lng, lat))
                && geometry::contains(lng, lat, &f.geometry)
        })
    }
}
