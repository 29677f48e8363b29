use tracing::debug;

use crate::models::field::Field;
use crate::models::observation::{Measurement, ObservationRecord};
use crate::models::remark::Remark;
use crate::models::signal::{RawObservation, RawSignal};
use crate::models::station::StationMetadata;
use crate::processors::quality_normalizer::{normalize, normalize_text, Normalized, SignalIssue};
use crate::processors::scaler::{compass_code, scale};

const CLOUD_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;

/// A field that degraded to missing while encoding a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWarning {
    pub field: Field,
    pub message: String,
}

impl std::fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRow {
    pub record: ObservationRecord,
    pub warnings: Vec<FieldWarning>,
}

/// Encodes raw source rows into canonical GWO records for one station.
#[derive(Debug, Clone)]
pub struct RowEncoder {
    station: StationMetadata,
}

impl RowEncoder {
    pub fn new(station: StationMetadata) -> Self {
        Self { station }
    }

    pub fn station(&self) -> &StationMetadata {
        &self.station
    }

    pub fn encode(&self, raw: &RawObservation) -> EncodedRow {
        let mut record = ObservationRecord::new(&self.station, raw.date, raw.hour);
        let mut warnings = Vec::new();

        for field in Field::ALL {
            let (measurement, issue) = encode_field(field, raw.signal(field));
            if let Some(issue) = issue {
                debug!(
                    "{} {} hour {}: {} degraded to missing ({})",
                    self.station.name_en, raw.date, raw.hour, field, issue
                );
                warnings.push(FieldWarning {
                    field,
                    message: format!("{} hour {}: {}", raw.date, raw.hour, issue),
                });
            }
            record.set(field, measurement);
        }

        EncodedRow { record, warnings }
    }
}

/// Encodes one field, applying the explicit-zero policy.
pub fn encode_field(field: Field, signal: Option<&RawSignal>) -> (Measurement, Option<SignalIssue>) {
    let Some(signal) = signal else {
        return (apply_zero_policy(field, Measurement::not_observed()), None);
    };

    let (measurement, issue) = match field {
        Field::WindDirection => (encode_direction(signal), None),
        Field::CloudCover => (encode_cloud(signal), None),
        _ => {
            let Normalized {
                value,
                remark,
                issue,
            } = normalize(signal);
            let value = value.map(|v| scale(v, field.scale()));
            (Measurement::new(value, remark), issue)
        }
    };

    (apply_zero_policy(field, measurement), issue)
}

fn encode_direction(signal: &RawSignal) -> Measurement {
    let text = normalize_text(signal);
    if text.remark.is_absent() {
        return Measurement::new(None, text.remark);
    }

    match text.token {
        Some(label) => {
            let (code, remark) = compass_code(&label, text.remark);
            Measurement::new(Some(i32::from(code)), remark)
        }
        None => Measurement::not_observed(),
    }
}

/// Cloud amount text such as `"10-"` or `"0+"`; anything unusable is "not observed".
fn encode_cloud(signal: &RawSignal) -> Measurement {
    let strip = |token: &str| token.trim().trim_end_matches(&['+', '-'][..]).to_string();
    let signal = match signal {
        RawSignal::Symbol(token) => RawSignal::Symbol(strip(token)),
        RawSignal::Numeric {
            value,
            quality,
            phenomenon_absent,
        } => RawSignal::Numeric {
            value: value.as_deref().map(strip),
            quality: quality.clone(),
            phenomenon_absent: phenomenon_absent.clone(),
        },
    };

    let normalized = normalize(&signal);
    match (normalized.value, normalized.remark) {
        (_, Remark::Missing | Remark::NotObserved | Remark::NoPhenomenon) => {
            Measurement::not_observed()
        }
        (Some(value), remark) if CLOUD_RANGE.contains(&value) => {
            Measurement::new(Some(value.round() as i32), remark)
        }
        _ => Measurement::not_observed(),
    }
}

fn apply_zero_policy(field: Field, measurement: Measurement) -> Measurement {
    if field.accepts_explicit_zero(measurement.remark) {
        return Measurement::new(Some(0), measurement.remark);
    }

    match measurement.remark {
        Remark::NotProduced | Remark::Missing | Remark::NotObserved => {
            Measurement::new(None, measurement.remark)
        }
        _ => measurement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn encoder() -> RowEncoder {
        RowEncoder::new(StationMetadata::new(
            "682".to_string(),
            "千葉".to_string(),
            "Chiba".to_string(),
        ))
    }

    fn raw(hour: u32) -> RawObservation {
        RawObservation::new(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), hour)
    }

    #[test]
    fn test_symbol_row_encoding() {
        let row = raw(3)
            .with_signal(Field::LocalPressure, RawSignal::symbol("1008.4"))
            .with_signal(Field::SeaPressure, RawSignal::symbol("1005.0"))
            .with_signal(Field::Precipitation, RawSignal::symbol("--"))
            .with_signal(Field::Temperature, RawSignal::symbol("5.2)"))
            .with_signal(Field::Humidity, RawSignal::symbol("65"))
            .with_signal(Field::WindDirection, RawSignal::symbol("北西"))
            .with_signal(Field::WindSpeed, RawSignal::symbol("3.1"))
            .with_signal(Field::Sunshine, RawSignal::symbol(""))
            .with_signal(Field::Solar, RawSignal::symbol("///"))
            .with_signal(Field::CloudCover, RawSignal::symbol("10-"));

        let encoded = encoder().encode(&row);
        let record = encoded.record;

        assert!(encoded.warnings.is_empty());
        assert_eq!(*record.measurement(Field::LocalPressure), Measurement::new(Some(10084), Remark::Normal));
        assert_eq!(*record.measurement(Field::SeaPressure), Measurement::new(Some(10050), Remark::Normal));
        assert_eq!(*record.measurement(Field::Precipitation), Measurement::new(Some(0), Remark::NoPhenomenon));
        assert_eq!(*record.measurement(Field::Temperature), Measurement::new(Some(52), Remark::Estimated));
        assert_eq!(*record.measurement(Field::Humidity), Measurement::new(Some(65), Remark::Normal));
        assert_eq!(*record.measurement(Field::WindDirection), Measurement::new(Some(14), Remark::Normal));
        assert_eq!(*record.measurement(Field::WindSpeed), Measurement::new(Some(31), Remark::Normal));
        assert_eq!(*record.measurement(Field::Sunshine), Measurement::new(Some(0), Remark::NotObserved));
        assert_eq!(*record.measurement(Field::Solar), Measurement::new(None, Remark::Missing));
        assert_eq!(*record.measurement(Field::CloudCover), Measurement::new(Some(10), Remark::Normal));
        // not supplied by the source
        assert_eq!(*record.measurement(Field::Weather), Measurement::new(None, Remark::NotObserved));
        assert_eq!(*record.measurement(Field::DewPoint), Measurement::new(None, Remark::NotObserved));
    }

    #[test]
    fn test_numeric_row_encoding() {
        let row = raw(12)
            .with_signal(Field::Precipitation, RawSignal::numeric(Some("0.0"), Some("8"), Some("1")))
            .with_signal(Field::Sunshine, RawSignal::numeric(Some(""), Some("0"), Some("0")))
            .with_signal(Field::Solar, RawSignal::numeric(Some("1.23"), Some("8"), None))
            .with_signal(Field::Temperature, RawSignal::numeric(Some("-1.5"), Some("4"), None))
            .with_signal(Field::Humidity, RawSignal::numeric(Some("80"), Some("1"), None))
            .with_signal(Field::WindDirection, RawSignal::numeric(Some("静穏"), Some("8"), None));

        let record = encoder().encode(&row).record;

        assert_eq!(*record.measurement(Field::Precipitation), Measurement::new(Some(0), Remark::NoPhenomenon));
        assert_eq!(*record.measurement(Field::Sunshine), Measurement::new(Some(0), Remark::NotObserved));
        assert_eq!(*record.measurement(Field::Solar), Measurement::new(Some(123), Remark::Normal));
        assert_eq!(*record.measurement(Field::Temperature), Measurement::new(Some(-15), Remark::Estimated));
        assert_eq!(*record.measurement(Field::Humidity), Measurement::new(None, Remark::Missing));
        assert_eq!(*record.measurement(Field::WindDirection), Measurement::new(Some(0), Remark::Normal));
    }

    #[test]
    fn test_absent_remarks_are_null() {
        let row = raw(5)
            .with_signal(Field::Temperature, RawSignal::symbol("///"))
            .with_signal(Field::SeaPressure, RawSignal::numeric(Some("1010.2"), Some("0"), None))
            .with_signal(Field::Precipitation, RawSignal::symbol(""))
            .with_signal(Field::WindDirection, RawSignal::symbol("north-ish"));

        let record = encoder().encode(&row).record;
        for (field, measurement) in record.measurements() {
            if measurement.remark.is_absent() && !field.accepts_explicit_zero(measurement.remark) {
                assert!(measurement.is_null(), "{} should be null", field);
            }
        }
        assert_eq!(*record.measurement(Field::WindDirection), Measurement::new(None, Remark::NotObserved));
    }

    #[test]
    fn test_parse_failure_surfaces_warning() {
        let row = raw(1).with_signal(Field::Temperature, RawSignal::symbol("1O.2"));
        let encoded = encoder().encode(&row);

        assert_eq!(
            *encoded.record.measurement(Field::Temperature),
            Measurement::new(None, Remark::Missing)
        );
        assert_eq!(encoded.warnings.len(), 1);
        assert_eq!(encoded.warnings[0].field, Field::Temperature);
    }

    #[test]
    fn test_cloud_edge_cases() {
        assert_eq!(encode_cloud(&RawSignal::symbol("0+")), Measurement::new(Some(0), Remark::Normal));
        assert_eq!(encode_cloud(&RawSignal::symbol("--")), Measurement::not_observed());
        assert_eq!(encode_cloud(&RawSignal::symbol("11")), Measurement::not_observed());
        assert_eq!(encode_cloud(&RawSignal::symbol("///")), Measurement::not_observed());
        assert_eq!(
            encode_cloud(&RawSignal::numeric(Some("7"), Some("5"), None)),
            Measurement::new(Some(7), Remark::Estimated)
        );
        // fractional amounts round like every other scaled value
        assert_eq!(encode_cloud(&RawSignal::symbol("7.6")), Measurement::new(Some(8), Remark::Normal));
        assert_eq!(encode_cloud(&RawSignal::symbol("2.4")), Measurement::new(Some(2), Remark::Normal));
    }
}
