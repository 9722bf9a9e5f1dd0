// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::geojson::GeoCollection;
use crate::{CoilError, Country};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

/// Where raw boundary documents come from.
pub trait GeoSource: Send + Sync {
    fn read(&self, country: Country) -> Result<String, CoilError>;

    /// Human-readable location, for logs.
    fn describe(&self, country: Country) -> String;
}

/// Reads `<data_dir>/<country>_adm1.geojson`.
#[derive(Debug, Clone)]
pub struct FileSource {
    data_dir: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, country: Country) -> PathBuf {
        self.data_dir.join(country.boundary_file_name())
    }
}

impl GeoSource for FileSource {
    fn read(&self, country: Country) -> Result<String, CoilError> {
        let path = self.path_for(country);
        if !path.is_file() {
            return Err(CoilError::DataUnavailable(country));
        }
        Ok(fs::read_to_string(path)?)
    }

    fn describe(&self, country: Country) -> String {
        self.path_for(country).display().to_string()
    }
}

type Slot = Arc<OnceLock<Option<Arc<GeoCollection>>>>;

/// Per-country memo of parsed boundary collections.
///
/// The first `load` for a country reads the source once; concurrent callers
/// for the same country block on that read. A failed load is remembered as
/// `None` until [`GeoStore::reload`] drops it.
pub struct GeoStore {
    source: Box<dyn GeoSource>,
    slots: Mutex<HashMap<Country, Slot>>,
}

impl GeoStore {
    pub fn new<S: GeoSource + 'static>(source: S) -> Self {
        Self {
            source: Box::new(source),
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        Self::new(FileSource::new(data_dir))
    }

    fn slot(&self, country: Country) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(slots.entry(country).or_default())
    }

    /// Parsed collection for `country`, or `None` when no usable data exists.
    pub fn load(&self, country: Country) -> Option<Arc<GeoCollection>> {
        let slot = self.slot(country);
        if let Some(cached) = slot.get() {
            debug!("GeoStore cache hit — country={} available={}", country, cached.is_some());
            return cached.clone();
        }
        slot.get_or_init(|| self.read_collection(country)).clone()
    }

    fn read_collection(&self, country: Country) -> Option<Arc<GeoCollection>> {
        let location = self.source.describe(country);
        let raw = match self.source.read(country) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Boundary source unavailable — country={} source={} error={}", country, location, e);
                return None;
            }
        };

        match GeoCollection::from_json_str(country, &raw) {
            Ok(collection) => {
                info!(
                    "Loaded boundaries — country={} source={} features={}",
                    country,
                    location,
                    collection.len()
                );
                Some(Arc::new(collection))
            }
            Err(e) => {
                warn!("Rejected boundary document — country={} source={} error={}", country, location, e);
                None
            }
        }
    }

    /// Forgets the cached result so the next `load` reads the source again.
    pub fn reload(&self, country: Country) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if slots.remove(&country).is_some() {
            debug!("GeoStore entry dropped — country={}", country);
        }
    }

    pub fn is_cached(&self, country: Country) -> bool {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.get(&country).is_some_and(|slot| slot.get().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    const ONE_FEATURE: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"name":"Test Region"},
         "geometry":{"type":"Polygon","coordinates":[[[0,0],[0,1],[1,1],[1,0],[0,0]]]}}]}"#;

    struct CountingSource {
        body: Option<&'static str>,
        reads: Arc<AtomicUsize>,
    }

    impl GeoSource for CountingSource {
        fn read(&self, country: Country) -> Result<String, CoilError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.body
                .map(str::to_string)
                .ok_or(CoilError::DataUnavailable(country))
        }

        fn describe(&self, _country: Country) -> String {
            "memory".to_string()
        }
    }

    fn counting(body: Option<&'static str>) -> (GeoStore, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let store = GeoStore::new(CountingSource {
            body,
            reads: Arc::clone(&reads),
        });
        (store, reads)
    }

    #[test]
    fn test_load_is_memoized() {
        let (store, reads) = counting(Some(ONE_FEATURE));
        let first = store.load(Country::Ph).unwrap();
        let second = store.load(Country::Ph).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert_eq!(first.country, Country::Ph);
        assert!(store.is_cached(Country::Ph));
        assert!(!store.is_cached(Country::Id));
    }

    #[test]
    fn test_absence_is_memoized_until_reload() {
        let (store, reads) = counting(None);
        assert!(store.load(Country::Id).is_none());
        assert!(store.load(Country::Id).is_none());
        assert_eq!(reads.load(Ordering::SeqCst), 1);

        store.reload(Country::Id);
        assert!(!store.is_cached(Country::Id));
        assert!(store.load(Country::Id).is_none());
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalid_document_is_absent() {
        let (store, _) = counting(Some("version https://git-lfs.github.com/spec/v1\n"));
        assert!(store.load(Country::Ph).is_none());
    }

    #[test]
    fn test_concurrent_first_load_reads_once() {
        let (store, reads) = counting(Some(ONE_FEATURE));
        let store = Arc::new(store);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.load(Country::Ph).map(|c| c.len()))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), Some(1));
        }
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path());
        assert!(matches!(source.read(Country::Ph), Err(CoilError::DataUnavailable(Country::Ph))));

        fs::write(dir.path().join("ph_adm1.geojson"), ONE_FEATURE).unwrap();
        assert_eq!(source.read(Country::Ph).unwrap(), ONE_FEATURE);
        assert!(source.describe(Country::Ph).ends_with("ph_adm1.geojson"));
    }
}
