// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! ADM1 boundary download and same-origin serving.

use crate::config::GeoConfig;
use crate::geojson::validate_document;
use crate::{CoilError, Country};
use log::{debug, info, warn};
use reqwest::header::{ACCEPT, USER_AGENT};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const GEOJSON_CONTENT_TYPE: &str = "application/geo+json";
const ACCEPT_HEADER: &str = "application/geo+json, application/json;q=0.9, */*;q=0.8";

/// geoBoundaries gbOpen ADM1 mirrors, tried in order.
pub fn default_urls(country: Country) -> Vec<String> {
    let iso = country.iso3();
    let path = format!("releaseData/gbOpen/{iso}/ADM1/geoBoundaries-{iso}-ADM1.geojson");
    vec![
        format!("https://rawcdn.githack.com/wmgeolab/geoBoundaries/main/{path}"),
        format!("https://cdn.jsdelivr.net/gh/wmgeolab/geoBoundaries@main/{path}"),
        format!("https://raw.githubusercontent.com/wmgeolab/geoBoundaries/main/{path}"),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub enum Adm1Origin {
    LocalOverride(PathBuf),
    Cache(PathBuf),
    Remote(String),
}

/// A validated FeatureCollection body and where it came from.
#[derive(Debug, Clone)]
pub struct Adm1Document {
    pub country: Country,
    pub body: String,
    pub origin: Adm1Origin,
}

impl Adm1Document {
    pub fn content_type(&self) -> &'static str {
        GEOJSON_CONTENT_TYPE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    /// Target existed and `force` was off.
    Skipped(PathBuf),
    Saved { path: PathBuf, url: String, bytes: usize },
    Failed,
}

#[derive(Debug, Clone)]
pub struct FetchReport {
    pub entries: Vec<(Country, FetchStatus)>,
}

impl FetchReport {
    pub fn downloaded(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, s)| matches!(s, FetchStatus::Saved { .. }))
            .count()
    }

    /// Every country ended with a usable file, fresh or pre-existing.
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|(_, s)| !matches!(s, FetchStatus::Failed))
    }
}

/// Downloads ADM1 documents from the configured mirrors.
pub struct Adm1Fetcher {
    client: reqwest::blocking::Client,
    config: GeoConfig,
}

impl Adm1Fetcher {
    pub fn new(config: GeoConfig) -> Result<Self, CoilError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeoConfig {
        &self.config
    }

    fn get(&self, url: &str) -> Result<String, CoilError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.config.user_agent.as_str())
            .header(ACCEPT, ACCEPT_HEADER)
            .send()?
            .error_for_status()?;
        Ok(response.text()?)
    }

    /// First mirror that returns a valid FeatureCollection.
    pub fn download(&self, country: Country) -> Result<Adm1Document, CoilError> {
        for url in self.config.urls_for(country) {
            info!("Fetching ADM1 — country={} url={}", country, url);
            let body = match self.get(&url) {
                Ok(body) => body,
                Err(e) => {
                    warn!("ADM1 mirror failed — country={} url={} error={}", country, url, e);
                    continue;
                }
            };
            if body.is_empty() {
                warn!("ADM1 mirror returned an empty body — country={} url={}", country, url);
                continue;
            }
            if let Err(e) = validate_document(&body) {
                warn!("ADM1 mirror returned unusable content — country={} url={} error={}", country, url, e);
                continue;
            }
            debug!("ADM1 downloaded — country={} url={} bytes={}", country, url, body.len());
            return Ok(Adm1Document {
                country,
                body,
                origin: Adm1Origin::Remote(url),
            });
        }
        Err(CoilError::AllSourcesFailed(country))
    }

    /// Downloads every country into the data directory. Existing files are
    /// kept unless `force` is set.
    pub fn fetch_all(&self, force: bool) -> Result<FetchReport, CoilError> {
        fs::create_dir_all(&self.config.data_dir)?;

        let mut entries = Vec::new();
        for country in Country::ALL {
            let target = self.config.boundary_path(country);
            if target.is_file() && !force {
                info!("ADM1 file exists, skipping — country={} path={}", country, target.display());
                entries.push((country, FetchStatus::Skipped(target)));
                continue;
            }

            let status = match self.download(country) {
                Ok(doc) => {
                    write_atomic(&target, &doc.body)?;
                    info!("Saved ADM1 — country={} path={} bytes={}", country, target.display(), doc.body.len());
                    let url = match doc.origin {
                        Adm1Origin::Remote(url) => url,
                        _ => String::new(),
                    };
                    FetchStatus::Saved {
                        path: target,
                        url,
                        bytes: doc.body.len(),
                    }
                }
                Err(e) => {
                    warn!("Failed to fetch ADM1 — country={} error={}", country, e);
                    FetchStatus::Failed
                }
            };
            entries.push((country, status));
        }
        Ok(FetchReport { entries })
    }
}

fn write_atomic(path: &Path, body: &str) -> Result<(), CoilError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("geojson.part");
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Serves ADM1 documents: local override, then cached copy, then remote
/// (which is cached for next time).
pub struct Adm1Provider {
    fetcher: Adm1Fetcher,
}

impl Adm1Provider {
    pub fn new(config: GeoConfig) -> Result<Self, CoilError> {
        Ok(Self {
            fetcher: Adm1Fetcher::new(config)?,
        })
    }

    pub fn resolve(&self, country: Country) -> Result<Adm1Document, CoilError> {
        let config = self.fetcher.config();

        let local = config.boundary_path(country);
        if local.is_file() {
            debug!("Serving ADM1 local override — country={} path={}", country, local.display());
            return Ok(Adm1Document {
                country,
                body: fs::read_to_string(&local)?,
                origin: Adm1Origin::LocalOverride(local),
            });
        }

        let cached = config.cache_path(country);
        if cached.is_file() {
            debug!("Serving ADM1 cached copy — country={} path={}", country, cached.display());
            return Ok(Adm1Document {
                country,
                body: fs::read_to_string(&cached)?,
                origin: Adm1Origin::Cache(cached),
            });
        }

        let doc = self.fetcher.download(country)?;
        if let Err(e) = write_atomic(&cached, &doc.body) {
            warn!("Could not cache ADM1 — country={} path={} error={}", country, cached.display(), e);
        }
        Ok(doc)
    }
}
