// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::canonical::Canonicalizer;
use crate::geojson::{GeoCollection, GeoFeature};
use crate::geometry::{self, BoundingBox};
use crate::Country;
use std::collections::HashMap;

/// Indonesian provinces by main island group, in display order. Names may be
/// English or Indonesian; they are canonicalized when the map is built.
const ID_GROUPS: &[(&str, &[&str])] = &[
    (
        "Sumatra",
        &[
            "Aceh",
            "North Sumatra",
            "West Sumatra",
            "Riau",
            "Riau Islands",
            "Jambi",
            "Bengkulu",
            "South Sumatra",
            "Bangka Belitung Islands",
            "Lampung",
        ],
    ),
    (
        "Java",
        &["Banten", "Jakarta", "West Java", "Central Java", "Yogyakarta", "East Java"],
    ),
    (
        "Kalimantan",
        &[
            "West Kalimantan",
            "Central Kalimantan",
            "South Kalimantan",
            "East Kalimantan",
            "North Kalimantan",
        ],
    ),
    (
        "Sulawesi",
        &[
            "North Sulawesi",
            "Gorontalo",
            "Central Sulawesi",
            "West Sulawesi",
            "South Sulawesi",
            "Southeast Sulawesi",
        ],
    ),
    (
        "Bali & Nusa Tenggara",
        &["Bali", "West Nusa Tenggara", "East Nusa Tenggara"],
    ),
    ("Maluku", &["Maluku", "North Maluku"]),
    (
        "Papua",
        &[
            "Papua",
            "West Papua",
            "Southwest Papua",
            "South Papua",
            "Central Papua",
            "Highland Papua",
        ],
    ),
];

/// Canonical unit name -> macro-group label, for one country.
#[derive(Debug, Clone, Default)]
pub struct MacroGroupMap {
    labels: Vec<String>,
    members: HashMap<String, usize>,
}

impl MacroGroupMap {
    pub fn build(
        canonicalizer: &Canonicalizer,
        country: Country,
        rows: &[(&str, &[&str])],
    ) -> Self {
        let mut map = Self::default();
        for (label, units) in rows {
            let idx = map.labels.len();
            map.labels.push(label.to_string());
            for unit in units.iter() {
                let key = canonicalizer.canonicalize(country, unit);
                if let Some(prev) = map.members.insert(key.clone(), idx) {
                    log::warn!(
                        "Unit listed in two groups — country={} unit={} first={} second={}",
                        country,
                        key,
                        map.labels[prev],
                        label
                    );
                }
            }
        }
        map
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.members.get(key).map(|&i| self.labels[i].as_str())
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn label_index(&self, label: &str) -> Option<usize> {
        let wanted = label.trim().to_lowercase();
        self.labels.iter().position(|l| l.to_lowercase() == wanted)
    }

    /// Canonical keys of the units in `label`, sorted.
    pub fn members_of(&self, label: &str) -> Vec<&str> {
        let Some(idx) = self.label_index(label) else {
            return Vec::new();
        };
        let mut keys: Vec<&str> = self
            .members
            .iter()
            .filter(|(_, &i)| i == idx)
            .map(|(k, _)| k.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }
}

/// Features sharing a macro-group label, with their combined extent.
#[derive(Debug, Clone)]
pub struct FeatureGroup<'c> {
    pub label: String,
    pub features: Vec<&'c GeoFeature>,
    pub bbox: Option<BoundingBox>,
}

impl<'c> FeatureGroup<'c> {
    fn new(label: String) -> Self {
        Self {
            label,
            features: Vec::new(),
            bbox: None,
        }
    }

    fn push(&mut self, feature: &'c GeoFeature) {
        if let Some(b) = geometry::bbox(&feature.geometry) {
            self.bbox = Some(match self.bbox {
                Some(acc) => acc.union(&b),
                None => b,
            });
        }
        self.features.push(feature);
    }
}

/// Maps fine-grained administrative units to coarse display groups.
#[derive(Debug, Clone)]
pub struct MacroGrouper {
    canonicalizer: Canonicalizer,
    ph: MacroGroupMap,
    id: MacroGroupMap,
}

impl Default for MacroGrouper {
    fn default() -> Self {
        Self::with_canonicalizer(Canonicalizer::default())
    }
}

impl MacroGrouper {
    pub fn new(canonicalizer: Canonicalizer, ph: MacroGroupMap, id: MacroGroupMap) -> Self {
        Self {
            canonicalizer,
            ph,
            id,
        }
    }

    /// Builds the built-in group maps on top of an existing canonicalizer.
    pub fn with_canonicalizer(canonicalizer: Canonicalizer) -> Self {
        let id = MacroGroupMap::build(&canonicalizer, Country::Id, ID_GROUPS);
        Self::new(canonicalizer, MacroGroupMap::default(), id)
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    pub fn map(&self, country: Country) -> &MacroGroupMap {
        match country {
            Country::Ph => &self.ph,
            Country::Id => &self.id,
        }
    }

    /// Group label of a unit, or `None` if the unit is ungrouped or the
    /// country has no groups (callers then use the unit's own name).
    pub fn group_of(&self, country: Country, name: &str) -> Option<&str> {
        let key = self.canonicalizer.canonicalize(country, name);
        if key.is_empty() {
            return None;
        }
        self.map(country).get(&key)
    }

    pub fn labels(&self, country: Country) -> &[String] {
        self.map(country).labels()
    }

    /// Canonical unit keys belonging to a group label (case-insensitive).
    pub fn expand(&self, country: Country, label: &str) -> Vec<&str> {
        self.map(country).members_of(label)
    }

    /// Buckets a collection for display. Grouped countries skip units that
    /// are not in any group; ungrouped countries get one bucket per named
    /// feature. Buckets keep first-seen order.
    pub fn group_features<'c>(
        &self,
        country: Country,
        collection: &'c GeoCollection,
    ) -> Vec<FeatureGroup<'c>> {
        let grouped = !self.map(country).is_empty();
        let mut groups: Vec<FeatureGroup<'c>> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for feature in &collection.features {
            let Some(name) = feature.display_name() else {
                continue;
            };
            let label = if grouped {
                match self.group_of(country, &name) {
                    Some(label) => label.to_string(),
                    None => {
                        log::debug!("Ungrouped unit skipped — country={} unit={}", country, name);
                        continue;
                    }
                }
            } else {
                name
            };

            let slot = *index.entry(label.clone()).or_insert_with(|| {
                groups.push(FeatureGroup::new(label));
                groups.len() - 1
            });
            groups[slot].push(feature);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::Geometry;
    use serde_json::{Map, Value};

    fn named(name: &str, ring: Vec<[f64; 2]>) -> GeoFeature {
        let mut properties = Map::new();
        properties.insert("shapeName".to_string(), Value::String(name.to_string()));
        GeoFeature {
            properties,
            geometry: Geometry::Polygon(vec![ring]),
        }
    }

    #[test]
    fn test_group_of() {
        let g = MacroGrouper::default();
        assert_eq!(g.group_of(Country::Id, "Aceh"), Some("Sumatra"));
        assert_eq!(g.group_of(Country::Id, "DI Yogyakarta"), Some("Java"));
        assert_eq!(g.group_of(Country::Id, "Daerah Istimewa Yogyakarta"), Some("Java"));
        assert_eq!(g.group_of(Country::Id, "Jawa Barat"), Some("Java"));
        assert_eq!(g.group_of(Country::Id, "Kepulauan Bangka Belitung"), Some("Sumatra"));
        assert_eq!(g.group_of(Country::Id, "Nusa Tenggara Timur"), Some("Bali & Nusa Tenggara"));
        assert_eq!(g.group_of(Country::Id, "Papua Pegunungan"), Some("Papua"));
        assert_eq!(g.group_of(Country::Id, "Unknown Province"), None);
        assert_eq!(g.group_of(Country::Id, ""), None);
    }

    #[test]
    fn test_group_keys_follow_the_canonicalizer() {
        use crate::canonical::AliasTable;

        // A table that knows the old Dutch-era spelling of Sulawesi Selatan
        let id = AliasTable::from_pairs(
            AliasTable::builtin(Country::Id)
                .iter()
                .chain([("celebes selatan", "sulawesi selatan")])
                .collect::<Vec<_>>(),
        );
        let g = MacroGrouper::with_canonicalizer(Canonicalizer::new(AliasTable::builtin(Country::Ph), id));

        assert_eq!(g.group_of(Country::Id, "Celebes Selatan"), Some("Sulawesi"));
        assert_eq!(g.group_of(Country::Id, "South Sulawesi"), Some("Sulawesi"));
        assert_eq!(MacroGrouper::default().group_of(Country::Id, "Celebes Selatan"), None);
    }

    #[test]
    fn test_ph_is_ungrouped() {
        let g = MacroGrouper::default();
        assert_eq!(g.group_of(Country::Ph, "Central Luzon"), None);
        assert!(g.labels(Country::Ph).is_empty());
    }

    #[test]
    fn test_all_provinces_covered() {
        let g = MacroGrouper::default();
        let labels = g.labels(Country::Id);
        assert_eq!(labels.len(), 7);
        let total: usize = labels.iter().map(|l| g.expand(Country::Id, l).len()).sum();
        assert_eq!(total, 38);
    }

    #[test]
    fn test_expand() {
        let g = MacroGrouper::default();
        assert_eq!(
            g.expand(Country::Id, "maluku"),
            vec!["maluku", "maluku utara"]
        );
        assert!(g.expand(Country::Id, "Atlantis").is_empty());
        assert!(g.expand(Country::Ph, "Java").is_empty());
    }

    #[test]
    fn test_group_features_id() {
        let g = MacroGrouper::default();
        let coll = GeoCollection {
            country: Country::Id,
            features: vec![
                named("Jawa Barat", vec![[106.0, -7.8], [108.8, -7.8], [108.8, -5.9], [106.0, -5.9]]),
                named("Aceh", vec![[95.0, 2.0], [98.3, 2.0], [98.3, 6.0], [95.0, 6.0]]),
                named("Jawa Timur", vec![[111.0, -8.8], [114.6, -8.8], [114.6, -6.7], [111.0, -6.7]]),
                named("Timor-Leste", vec![[124.0, -9.5], [127.3, -9.5], [127.3, -8.1], [124.0, -8.1]]),
            ],
        };

        let groups = g.group_features(Country::Id, &coll);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Java", "Sumatra"]);
        assert_eq!(groups[0].features.len(), 2);
        assert_eq!(
            groups[0].bbox.unwrap().to_array(),
            [106.0, -8.8, 114.6, -5.9]
        );
    }

    #[test]
    fn test_group_features_ph_uses_unit_names() {
        let g = MacroGrouper::default();
        let coll = GeoCollection {
            country: Country::Ph,
            features: vec![
                named("Central Luzon", vec![[119.8, 14.5], [122.0, 14.5], [122.0, 16.0]]),
                named("Caraga", vec![]),
            ],
        };
        let groups = g.group_features(Country::Ph, &coll);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].label, "Caraga");
        assert!(groups[1].bbox.is_none());
    }
}
