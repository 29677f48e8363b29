use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use validator::Validate;

use crate::error::{ProcessingError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationMetadata {
    /// Station code as written to the archive identity columns.
    #[validate(length(min = 1))]
    pub code: String,

    /// Display name as written to the archive identity columns.
    #[validate(length(min = 1))]
    pub name: String,

    /// Romanized name, used for archive directory and file names.
    #[validate(length(min = 1))]
    pub name_en: String,

    #[serde(default)]
    pub block_no: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub longitude: Option<f64>,

    #[serde(default)]
    pub remarks: Vec<StationRemark>,
}

/// Dated note about a station (relocation, instrument change, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRemark {
    pub note: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub source: Option<String>,
}

impl StationMetadata {
    pub fn new(code: String, name: String, name_en: String) -> Self {
        Self {
            code,
            name,
            name_en,
            block_no: None,
            latitude: None,
            longitude: None,
            remarks: Vec::new(),
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_remark(mut self, remark: StationRemark) -> Self {
        self.remarks.push(remark);
        self
    }

    /// Remarks whose validity window overlaps the given calendar year,
    /// each note reported once.
    pub fn remarks_for_year(&self, year: i32) -> Vec<&StationRemark> {
        let mut seen = std::collections::BTreeSet::new();
        self.remarks
            .iter()
            .filter(|remark| {
                let starts_before_end = remark.start_date.map_or(true, |d| d.year() <= year);
                let ends_after_start = remark.end_date.map_or(true, |d| d.year() >= year);
                starts_before_end && ends_after_start
            })
            .filter(|remark| seen.insert(remark.note.as_str()))
            .collect()
    }
}

/// Station lookup keyed by romanized name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationCatalog {
    pub stations: BTreeMap<String, StationMetadata>,
}

impl StationCatalog {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let catalog: StationCatalog = serde_json::from_str(content)
            .map_err(|e| ProcessingError::InvalidFormat(format!("station catalog: {}", e)))?;

        for station in catalog.stations.values() {
            station.validate()?;
        }

        Ok(catalog)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Finds a station by romanized name (case-insensitive) or station code.
    pub fn find(&self, key: &str) -> Result<&StationMetadata> {
        self.stations
            .iter()
            .find(|(name, station)| name.eq_ignore_ascii_case(key) || station.code == key)
            .map(|(_, station)| station)
            .ok_or_else(|| ProcessingError::StationNotFound(key.to_string()))
    }
}
