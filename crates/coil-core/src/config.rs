// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::Country;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "coil.json";
pub const DEFAULT_USER_AGENT: &str = "coil-project/1.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "coil", "coil")
}

/// Platform config directory, falling back to the working directory.
pub fn get_config_root() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoConfig {
    /// Local boundary files (`ph_adm1.geojson`, ...). Also the local override
    /// location for the ADM1 provider.
    pub data_dir: PathBuf,
    /// Where remotely fetched ADM1 documents are cached.
    pub cache_dir: PathBuf,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Replaces the built-in mirror list for a country when present.
    #[serde(default)]
    pub urls: BTreeMap<Country, Vec<String>>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for GeoConfig {
    fn default() -> Self {
        let (data_dir, cache_dir) = match project_dirs() {
            Some(dirs) => (dirs.data_dir().join("geo"), dirs.cache_dir().join("geo")),
            None => (PathBuf::from("data/geo"), PathBuf::from("cache/geo")),
        };
        Self {
            data_dir,
            cache_dir,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            urls: BTreeMap::new(),
        }
    }
}

impl GeoConfig {
    pub fn default_path() -> PathBuf {
        get_config_root().join(CONFIG_FILE_NAME)
    }

    /// Loads the config from the default location, or defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    /// Missing or unreadable files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config file, using defaults — path={}", path.display());
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<GeoConfig>(&content) {
                Ok(config) => config,
                Err(e) => {
                    log::error!("Config parse error, using defaults — path={} error={}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::error!("Config read error, using defaults — path={} error={}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn with_data_dir<P: Into<PathBuf>>(mut self, data_dir: P) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn boundary_path(&self, country: Country) -> PathBuf {
        self.data_dir.join(country.boundary_file_name())
    }

    pub fn cache_path(&self, country: Country) -> PathBuf {
        self.cache_dir.join(country.boundary_file_name())
    }

    /// Mirror URLs for `country`: the configured list, else the built-in one.
    pub fn urls_for(&self, country: Country) -> Vec<String> {
        match self.urls.get(&country) {
            Some(urls) => urls.clone(),
            None => crate::fetch::default_urls(country),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeoConfig::load_from(&dir.path().join("nope.json"));
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_round_trip_and_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = GeoConfig::default().with_data_dir(dir.path().join("geo"));
        config.urls.insert(Country::Ph, vec!["http://127.0.0.1:9/ph.geojson".to_string()]);
        config.save_to(&path).unwrap();
        assert_eq!(GeoConfig::load_from(&path), config);

        // Optional fields fall back to their defaults
        let partial = dir.path().join("partial.json");
        fs::write(&partial, r#"{"data_dir": "/srv/geo", "cache_dir": "/tmp/geo"}"#).unwrap();
        let loaded = GeoConfig::load_from(&partial);
        assert_eq!(loaded.data_dir, PathBuf::from("/srv/geo"));
        assert_eq!(loaded.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(loaded.boundary_path(Country::Id), PathBuf::from("/srv/geo/id_adm1.geojson"));
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(GeoConfig::load_from(&path).user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_url_override() {
        let mut config = GeoConfig::default();
        assert_eq!(config.urls_for(Country::Id).len(), 3);
        config.urls.insert(Country::Id, vec!["http://mirror/id.geojson".to_string()]);
        assert_eq!(config.urls_for(Country::Id), vec!["http://mirror/id.geojson"]);
        assert_eq!(config.urls_for(Country::Ph).len(), 3);
    }
}
