use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;

use crate::models::field::Field;

/// A raw per-field observation as delivered by an upstream source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSignal {
    /// Single text token with embedded quality markers, e.g. `"12.3)"` or `"///"`.
    Symbol(String),
    /// Separate value, numeric quality code and phenomenon-absent flag columns.
    Numeric {
        value: Option<String>,
        quality: Option<String>,
        phenomenon_absent: Option<String>,
    },
}

impl RawSignal {
    pub fn symbol(token: impl Into<String>) -> Self {
        RawSignal::Symbol(token.into())
    }

    pub fn numeric(value: Option<&str>, quality: Option<&str>, phenomenon_absent: Option<&str>) -> Self {
        RawSignal::Numeric {
            value: value.map(str::to_string),
            quality: quality.map(str::to_string),
            phenomenon_absent: phenomenon_absent.map(str::to_string),
        }
    }
}

/// One source row: calendar position plus whatever signals the source supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObservation {
    pub date: NaiveDate,
    /// 1..=24
    pub hour: u32,
    pub signals: BTreeMap<Field, RawSignal>,
}

impl RawObservation {
    pub fn new(date: NaiveDate, hour: u32) -> Self {
        Self {
            date,
            hour,
            signals: BTreeMap::new(),
        }
    }

    pub fn with_signal(mut self, field: Field, signal: RawSignal) -> Self {
        self.signals.insert(field, signal);
        self
    }

    pub fn signal(&self, field: Field) -> Option<&RawSignal> {
        self.signals.get(&field)
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN) + Duration::hours(self.hour as i64)
    }
}
