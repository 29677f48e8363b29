use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::field::Field;
use crate::models::remark::Remark;
use crate::models::station::StationMetadata;

/// One measured quantity in archive units together with its remark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: Option<i32>,
    pub remark: Remark,
}

impl Measurement {
    pub fn new(value: Option<i32>, remark: Remark) -> Self {
        Self { value, remark }
    }

    pub fn not_observed() -> Self {
        Self::new(None, Remark::NotObserved)
    }

    pub fn missing() -> Self {
        Self::new(None, Remark::Missing)
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

impl Default for Measurement {
    fn default() -> Self {
        Self::not_observed()
    }
}

/// A canonical GWO hourly record: identity, calendar position and 13 measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub station_code: String,
    pub station_name: String,
    /// Repeated station code column; legacy archives may differ from the first.
    pub station_code_repeat: String,
    pub date: NaiveDate,
    /// Hour of day, 1..=24; hour 24 is midnight at the end of `date`.
    pub hour: u32,
    measurements: [Measurement; 13],
}

impl ObservationRecord {
    pub fn new(station: &StationMetadata, date: NaiveDate, hour: u32) -> Self {
        Self::with_identity(
            station.code.clone(),
            station.name.clone(),
            station.code.clone(),
            date,
            hour,
        )
    }

    pub fn with_identity(
        station_code: String,
        station_name: String,
        station_code_repeat: String,
        date: NaiveDate,
        hour: u32,
    ) -> Self {
        Self {
            station_code,
            station_name,
            station_code_repeat,
            date,
            hour,
            measurements: [Measurement::not_observed(); 13],
        }
    }

    /// Instant of the observation; hour 24 rolls over to 00:00 of the next day.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.date.and_time(chrono::NaiveTime::MIN) + Duration::hours(self.hour as i64)
    }

    pub fn measurement(&self, field: Field) -> &Measurement {
        &self.measurements[field.index()]
    }

    pub fn measurement_mut(&mut self, field: Field) -> &mut Measurement {
        &mut self.measurements[field.index()]
    }

    pub fn set(&mut self, field: Field, measurement: Measurement) {
        self.measurements[field.index()] = measurement;
    }

    pub fn value(&self, field: Field) -> Option<i32> {
        self.measurement(field).value
    }

    pub fn remark(&self, field: Field) -> Remark {
        self.measurement(field).remark
    }

    pub fn measurements(&self) -> impl Iterator<Item = (Field, &Measurement)> {
        Field::ALL.iter().map(move |field| (*field, self.measurement(*field)))
    }
}
