//! Station lookup table
//!
//! Analysis tooling turns station ids into names. The table is owned by the
//! caller and passed by reference to whatever needs it; decoding never reads
//! it.
//!
//! ```yaml
//! - station_id: 101
//!   name_chinese: 北京南
//!   name_english: Beijing South
//!   line: Jinghu
//!   kilometer: 0.0
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Name returned by [`StationTable::chinese_name`] for unknown ids.
pub const UNKNOWN_CHINESE: &str = "未知";
/// Name returned by [`StationTable::english_name`] for unknown ids.
pub const UNKNOWN_ENGLISH: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub station_id: u32,
    pub name_chinese: String,
    pub name_english: String,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub kilometer: Option<f64>,
}

/// Which name a search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Chinese,
    English,
}

/// Stations keyed by id.
#[derive(Debug, Clone, Default)]
pub struct StationTable {
    stations: BTreeMap<u32, Station>,
}

impl StationTable {
    /// Build a table; later duplicates of an id replace earlier ones.
    ///
    /// Stations with an empty name in either language are rejected.
    pub fn new(stations: impl IntoIterator<Item = Station>) -> Result<Self> {
        let mut table = BTreeMap::new();
        for station in stations {
            if station.name_chinese.trim().is_empty() || station.name_english.trim().is_empty() {
                return Err(Error::config(
                    "station table",
                    format!("station {} has an empty name", station.station_id),
                ));
            }
            table.insert(station.station_id, station);
        }
        Ok(Self { stations: table })
    }

    /// Parse a YAML list of stations.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let stations: Vec<Station> = serde_yaml_ng::from_str(yaml)
            .map_err(|e| Error::config("station table", e.to_string()))?;
        Self::new(stations)
    }

    /// Load a YAML station file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| Error::file_error(path.to_path_buf(), e))?;
        let table = Self::from_yaml_str(&yaml)?;
        debug!(path = %path.display(), stations = table.len(), "Loaded station table");
        Ok(table)
    }

    pub fn get(&self, station_id: u32) -> Option<&Station> {
        self.stations.get(&station_id)
    }

    pub fn chinese_name(&self, station_id: u32) -> &str {
        self.get(station_id).map_or(UNKNOWN_CHINESE, |s| s.name_chinese.as_str())
    }

    pub fn english_name(&self, station_id: u32) -> &str {
        self.get(station_id).map_or(UNKNOWN_ENGLISH, |s| s.name_english.as_str())
    }

    /// Stations whose name contains `needle`, in id order.
    ///
    /// English matching ignores case.
    pub fn search(&self, needle: &str, language: Language) -> Vec<&Station> {
        let lowered = needle.to_lowercase();
        self.stations
            .values()
            .filter(|station| match language {
                Language::Chinese => station.name_chinese.contains(needle),
                Language::English => station.name_english.to_lowercase().contains(&lowered),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// All stations in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }
}
