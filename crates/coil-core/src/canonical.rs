// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Region name canonicalization.
//!
//! Names arrive from several conventions: English and Indonesian province
//! names, numbered "Region" labels, abbreviations. Each is reduced to a
//! lowercase, punctuation-free key and then passed through a per-country
//! alias table, so `"NCR"` and `"Metro Manila"` compare equal.

use crate::Country;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

const PH_ALIASES: &[(&str, &str)] = &[
    ("ncr", "national capital region"),
    ("metro manila", "national capital region"),
    ("car", "cordillera administrative region"),
    ("cordillera", "cordillera administrative region"),
    ("region 1", "ilocos region"),
    ("region i", "ilocos region"),
    ("ilocos", "ilocos region"),
    ("region 2", "cagayan valley"),
    ("region ii", "cagayan valley"),
    ("region 3", "central luzon"),
    ("region iii", "central luzon"),
    ("region 4a", "calabarzon"),
    ("region iva", "calabarzon"),
    ("region 4b", "mimaropa region"),
    ("region ivb", "mimaropa region"),
    ("mimaropa", "mimaropa region"),
    ("region 5", "bicol region"),
    ("region v", "bicol region"),
    ("bicol", "bicol region"),
    ("region 6", "western visayas"),
    ("region vi", "western visayas"),
    ("region 7", "central visayas"),
    ("region vii", "central visayas"),
    ("region 8", "eastern visayas"),
    ("region viii", "eastern visayas"),
    ("region 9", "zamboanga peninsula"),
    ("region ix", "zamboanga peninsula"),
    ("region 10", "northern mindanao"),
    ("region x", "northern mindanao"),
    ("region 11", "davao region"),
    ("region xi", "davao region"),
    ("davao", "davao region"),
    ("region 12", "soccsksargen"),
    ("region xii", "soccsksargen"),
    ("region 13", "caraga"),
    ("region xiii", "caraga"),
    ("barmm", "bangsamoro autonomous region in muslim mindanao"),
    ("armm", "bangsamoro autonomous region in muslim mindanao"),
    ("bangsamoro", "bangsamoro autonomous region in muslim mindanao"),
    (
        "autonomous region in muslim mindanao",
        "bangsamoro autonomous region in muslim mindanao",
    ),
];

const ID_ALIASES: &[(&str, &str)] = &[
    // Java
    ("jakarta", "dki jakarta"),
    ("dki", "dki jakarta"),
    ("daerah khusus ibukota jakarta", "dki jakarta"),
    ("daerah khusus ibu kota jakarta", "dki jakarta"),
    ("special capital region of jakarta", "dki jakarta"),
    ("yogyakarta", "di yogyakarta"),
    ("daerah istimewa yogyakarta", "di yogyakarta"),
    ("special region of yogyakarta", "di yogyakarta"),
    ("west java", "jawa barat"),
    ("central java", "jawa tengah"),
    ("east java", "jawa timur"),
    // Lesser Sunda
    ("west nusa tenggara", "nusa tenggara barat"),
    ("east nusa tenggara", "nusa tenggara timur"),
    ("ntb", "nusa tenggara barat"),
    ("ntt", "nusa tenggara timur"),
    // Kalimantan
    ("west kalimantan", "kalimantan barat"),
    ("central kalimantan", "kalimantan tengah"),
    ("south kalimantan", "kalimantan selatan"),
    ("east kalimantan", "kalimantan timur"),
    ("north kalimantan", "kalimantan utara"),
    // Sulawesi
    ("north sulawesi", "sulawesi utara"),
    ("central sulawesi", "sulawesi tengah"),
    ("south sulawesi", "sulawesi selatan"),
    ("southeast sulawesi", "sulawesi tenggara"),
    ("west sulawesi", "sulawesi barat"),
    // Maluku
    ("north maluku", "maluku utara"),
    // Sumatra
    ("riau islands", "kepulauan riau"),
    ("bangka belitung", "kepulauan bangka belitung"),
    ("bangka belitung islands", "kepulauan bangka belitung"),
    ("west sumatra", "sumatera barat"),
    ("north sumatra", "sumatera utara"),
    ("south sumatra", "sumatera selatan"),
    // Papua
    ("west papua", "papua barat"),
    ("south papua", "papua selatan"),
    ("central papua", "papua tengah"),
    ("mountain papua", "papua pegunungan"),
    ("highland papua", "papua pegunungan"),
    ("southwest papua", "papua barat daya"),
];

/// Lowercases, strips punctuation and collapses whitespace. No alias lookup.
pub fn normalize(raw: &str) -> String {
    static RE_PUNCT: OnceLock<Regex> = OnceLock::new();
    static RE_SPACE: OnceLock<Regex> = OnceLock::new();
    let punct = RE_PUNCT.get_or_init(|| Regex::new(r"[^a-z0-9\s]").unwrap());
    let space = RE_SPACE.get_or_init(|| Regex::new(r"\s+").unwrap());

    let lower = raw.trim().to_lowercase();
    let stripped = punct.replace_all(&lower, "");
    space.replace_all(stripped.trim(), " ").into_owned()
}

/// Alternate spelling -> canonical key, for one country.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    /// Both sides are normalized on the way in, so lookups only ever see
    /// normalized keys.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let entries = pairs
            .into_iter()
            .map(|(key, value)| (normalize(key), normalize(value)))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Self { entries }
    }

    pub fn builtin(country: Country) -> Self {
        match country {
            Country::Ph => Self::from_pairs(PH_ALIASES.iter().copied()),
            Country::Id => Self::from_pairs(ID_ALIASES.iter().copied()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct Canonicalizer {
    ph: AliasTable,
    id: AliasTable,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(AliasTable::builtin(Country::Ph), AliasTable::builtin(Country::Id))
    }
}

impl Canonicalizer {
    pub fn new(ph: AliasTable, id: AliasTable) -> Self {
        Self { ph, id }
    }

    pub fn aliases(&self, country: Country) -> &AliasTable {
        match country {
            Country::Ph => &self.ph,
            Country::Id => &self.id,
        }
    }

    /// Canonical comparison key for `raw` in `country`. Empty input gives an
    /// empty key, which callers treat as "no match".
    pub fn canonicalize(&self, country: Country, raw: &str) -> String {
        let key = normalize(raw);
        match self.aliases(country).get(&key) {
            Some(canonical) => canonical.to_string(),
            None => key,
        }
    }
}
