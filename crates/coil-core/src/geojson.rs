// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::{CoilError, Country};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

/// A closed sequence of `[lng, lat]` points. Explicit closure is not assumed.
pub type Ring = Vec<[f64; 2]>;

/// Property keys that carry a display name, in priority order.
/// Providers disagree on the key; the first non-empty one wins.
pub const NAME_KEYS: &[&str] = &[
    "name",
    "shapeName",
    "NAME_1",
    "NAME",
    "region",
    "Province",
    "province",
];

const LFS_POINTER_PREFIX: &str = "version https://git-lfs.github.com/spec/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Geometry {
    /// Ring 0 is the outer boundary, the rest are holes.
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
    /// Anything else, kept verbatim so it serialises back unchanged.
    Unsupported(Value),
}

impl Geometry {
    pub fn type_name(&self) -> &str {
        match self {
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::Unsupported(raw) => raw
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("Unsupported"),
        }
    }

    /// Polygons as slices of rings, a Polygon being a MultiPolygon of one.
    pub fn polygons(&self) -> Vec<&[Ring]> {
        match self {
            Geometry::Polygon(rings) => vec![rings.as_slice()],
            Geometry::MultiPolygon(polys) => polys.iter().map(Vec::as_slice).collect(),
            Geometry::Unsupported(_) => Vec::new(),
        }
    }
}

fn to_ring(positions: Vec<::geojson::Position>) -> Ring {
    positions
        .into_iter()
        .filter_map(|pos| match *pos.as_slice() {
            [lng, lat, ..] => Some([lng, lat]),
            _ => None,
        })
        .collect()
}

fn to_rings(polygon: ::geojson::PolygonType) -> Vec<Ring> {
    polygon.into_iter().map(to_ring).collect()
}

impl From<Value> for Geometry {
    fn from(raw: Value) -> Self {
        let decoded = match ::geojson::Geometry::try_from(raw.clone()) {
            Ok(geom) => geom.value,
            Err(e) => {
                log::debug!("Geometry kept as unsupported — error={}", e);
                return Geometry::Unsupported(raw);
            }
        };
        match decoded {
            ::geojson::Value::Polygon(rings) => Geometry::Polygon(to_rings(rings)),
            ::geojson::Value::MultiPolygon(polys) => {
                Geometry::MultiPolygon(polys.into_iter().map(to_rings).collect())
            }
            _ => Geometry::Unsupported(raw),
        }
    }
}

impl From<Geometry> for Value {
    fn from(geom: Geometry) -> Self {
        match geom {
            Geometry::Polygon(rings) => json!({ "type": "Polygon", "coordinates": rings }),
            Geometry::MultiPolygon(polys) => {
                json!({ "type": "MultiPolygon", "coordinates": polys })
            }
            Geometry::Unsupported(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFeature {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
    #[serde(default = "null_geometry")]
    pub geometry: Geometry,
}

/// `"properties": null` is valid GeoJSON and reads as no properties.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_geometry() -> Geometry {
    Geometry::Unsupported(Value::Null)
}

impl GeoFeature {
    /// First non-empty value among [`NAME_KEYS`]. Numbers are rendered as text.
    pub fn display_name(&self) -> Option<String> {
        NAME_KEYS.iter().find_map(|key| {
            let name = match self.properties.get(*key)? {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            (!name.is_empty()).then_some(name)
        })
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": "Feature",
            "properties": self.properties,
            "geometry": Value::from(self.geometry.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoCollection {
    pub country: Country,
    pub features: Vec<GeoFeature>,
}

impl GeoCollection {
    /// Parses a FeatureCollection document. LFS pointer stubs, non-JSON and
    /// documents of any other `type` are rejected as a whole; individual
    /// features that are not objects are dropped.
    pub fn from_json_str(country: Country, raw: &str) -> Result<Self, CoilError> {
        let doc = validate_document(raw)?;
        let features = match doc.get("features") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(CoilError::InvalidGeoJson(
                    "FeatureCollection has no features array".to_string(),
                ))
            }
        };

        let mut parsed = Vec::with_capacity(features.len());
        for (i, item) in features.iter().enumerate() {
            if !item.is_object() {
                log::warn!("Skipping non-object feature — country={} index={}", country, i);
                continue;
            }
            match serde_json::from_value::<GeoFeature>(item.clone()) {
                Ok(feature) => parsed.push(feature),
                Err(e) => {
                    log::warn!(
                        "Skipping unreadable feature — country={} index={} error={}",
                        country,
                        i,
                        e
                    );
                }
            }
        }

        Ok(Self {
            country,
            features: parsed,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.features.iter().map(GeoFeature::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Checks that `raw` is a GeoJSON FeatureCollection and returns the decoded value.
pub fn validate_document(raw: &str) -> Result<Value, CoilError> {
    let trimmed = raw.trim_start();
    if trimmed.is_empty() {
        return Err(CoilError::InvalidGeoJson("empty document".to_string()));
    }
    if trimmed.starts_with(LFS_POINTER_PREFIX) {
        return Err(CoilError::InvalidGeoJson(
            "Git LFS pointer instead of content".to_string(),
        ));
    }

    let doc: Value = serde_json::from_str(trimmed)
        .map_err(|e| CoilError::InvalidGeoJson(format!("not JSON: {}", e)))?;
    match doc.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => Ok(doc),
        Some(other) => Err(CoilError::InvalidGeoJson(format!(
            "expected FeatureCollection, found {}",
            other
        ))),
        None => Err(CoilError::InvalidGeoJson("missing type".to_string())),
    }
}
