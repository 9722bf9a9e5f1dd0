// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod canonical;
pub mod config;
pub mod fetch;
pub mod geojson;
pub mod geometry;
pub mod grouping;
pub mod resolver;
pub mod service;
pub mod store;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use canonical::{AliasTable, Canonicalizer};
pub use crate::geojson::{GeoCollection, GeoFeature, Geometry};
pub use geometry::BoundingBox;
pub use grouping::{FeatureGroup, MacroGrouper};
pub use resolver::RegionResolver;
pub use service::GeoRegionService;
pub use store::{FileSource, GeoSource, GeoStore};

#[derive(Error, Debug)]
pub enum CoilError {
    #[error("Unsupported country: {0}")]
    UnsupportedCountry(String),
    #[error("No boundary data available for {0}")]
    DataUnavailable(Country),
    #[error("Invalid GeoJSON document: {0}")]
    InvalidGeoJson(String),
    #[error("Failed to fetch ADM1 GeoJSON for {0}")]
    AllSourcesFailed(Country),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Countries with ADM1 boundary data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    Ph,
    Id,
}

impl Country {
    pub const ALL: [Country; 2] = [Country::Ph, Country::Id];

    pub fn code(&self) -> &'static str {
        match self {
            Country::Ph => "ph",
            Country::Id => "id",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Country::Ph => "Philippines",
            Country::Id => "Indonesia",
        }
    }

    /// ISO 3166-1 alpha-3, as used in geoBoundaries release paths.
    pub fn iso3(&self) -> &'static str {
        match self {
            Country::Ph => "PHL",
            Country::Id => "IDN",
        }
    }

    /// File name of the ADM1 boundary collection inside the data directory.
    pub fn boundary_file_name(&self) -> String {
        format!("{}_adm1.geojson", self.code())
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Country {
    type Err = CoilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ph" => Ok(Country::Ph),
            "id" => Ok(Country::Id),
            _ => Err(CoilError::UnsupportedCountry(s.to_string())),
        }
    }
}
