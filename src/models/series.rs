use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::field::{Field, MaskPolicy, FIELD_COUNT};
use crate::models::observation::ObservationRecord;
use crate::models::remark::Remark;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    /// Archive fixed-point integers.
    Canonical,
    /// Physical units, see [`Field::physical_units`].
    Physical,
}

/// One time step of a reconstructed series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub timestamp: NaiveDateTime,
    pub station_code: Option<String>,
    pub station_name: Option<String>,
    pub values: [Option<f64>; FIELD_COUNT],
    pub remarks: [Option<Remark>; FIELD_COUNT],
    /// Eastward wind component, physical tables only.
    pub u: Option<f64>,
    /// Northward wind component, physical tables only.
    pub v: Option<f64>,
}

impl SeriesRow {
    pub fn empty(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            station_code: None,
            station_name: None,
            values: [None; FIELD_COUNT],
            remarks: [None; FIELD_COUNT],
            u: None,
            v: None,
        }
    }

    /// Builds a row from an archive record, nulling values whose remark the policy masks.
    pub fn from_record(record: &ObservationRecord, policy: Option<&MaskPolicy>) -> Self {
        let mut row = Self::empty(record.timestamp());
        row.station_code = Some(record.station_code.clone());
        row.station_name = Some(record.station_name.clone());

        for (field, measurement) in record.measurements() {
            let masked = policy.map_or(false, |p| p.masks(field, measurement.remark));
            row.values[field.index()] = if masked {
                None
            } else {
                measurement.value.map(f64::from)
            };
            row.remarks[field.index()] = Some(measurement.remark);
        }

        row
    }

    pub fn value(&self, field: Field) -> Option<f64> {
        self.values[field.index()]
    }

    pub fn remark(&self, field: Field) -> Option<Remark> {
        self.remarks[field.index()]
    }

    fn to_physical(&self) -> Self {
        let mut row = self.clone();
        for field in Field::ALL {
            row.values[field.index()] = self.value(field).map(|v| field.to_physical(v));
        }

        if let (Some(speed), Some(bearing)) = (
            row.value(Field::WindSpeed),
            row.value(Field::WindDirection),
        ) {
            let radians = bearing.to_radians();
            row.u = Some(speed * radians.cos());
            row.v = Some(speed * radians.sin());
        }

        row
    }
}

/// Time-ordered table of series rows for one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesTable {
    pub station: String,
    pub units: Units,
    pub rows: Vec<SeriesRow>,
}

impl SeriesTable {
    pub fn new(station: &str) -> Self {
        Self {
            station: station.to_string(),
            units: Units::Canonical,
            rows: Vec::new(),
        }
    }

    /// Builds a canonical table sorted by timestamp.
    pub fn from_records(
        station: &str,
        records: &[ObservationRecord],
        policy: Option<&MaskPolicy>,
    ) -> Self {
        let mut rows: Vec<SeriesRow> = records
            .iter()
            .map(|record| SeriesRow::from_record(record, policy))
            .collect();
        rows.sort_by_key(|row| row.timestamp);

        Self {
            station: station.to_string(),
            units: Units::Canonical,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.rows.iter().map(|row| row.timestamp).collect()
    }

    pub fn column(&self, field: Field) -> Vec<Option<f64>> {
        self.rows.iter().map(|row| row.value(field)).collect()
    }

    pub fn remark_column(&self, field: Field) -> Vec<Option<Remark>> {
        self.rows.iter().map(|row| row.remark(field)).collect()
    }

    pub fn set_column(&mut self, field: Field, values: &[Option<f64>]) {
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.values[field.index()] = *value;
        }
    }

    /// Rows within the closed interval `[start, end]`.
    pub fn clip(&self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            station: self.station.clone(),
            units: self.units,
            rows: self
                .rows
                .iter()
                .filter(|row| row.timestamp >= start && row.timestamp <= end)
                .cloned()
                .collect(),
        }
    }

    /// Converts canonical values to physical units and derives wind components.
    pub fn to_physical(&self) -> Self {
        if self.units == Units::Physical {
            return self.clone();
        }

        Self {
            station: self.station.clone(),
            units: Units::Physical,
            rows: self.rows.iter().map(SeriesRow::to_physical).collect(),
        }
    }

    pub fn find(&self, timestamp: NaiveDateTime) -> Option<&SeriesRow> {
        self.rows
            .binary_search_by_key(&timestamp, |row| row.timestamp)
            .ok()
            .map(|i| &self.rows[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::observation::Measurement;
    use crate::models::station::StationMetadata;
    use chrono::NaiveDate;

    fn record(day: u32, hour: u32, temp: Option<i32>, remark: Remark) -> ObservationRecord {
        let station =
            StationMetadata::new("682".to_string(), "千葉".to_string(), "Chiba".to_string());
        let mut record =
            ObservationRecord::new(&station, NaiveDate::from_ymd_opt(2020, 3, day).unwrap(), hour);
        record.set(Field::Temperature, Measurement::new(temp, remark));
        record.set(Field::WindSpeed, Measurement::new(Some(30), Remark::Normal));
        record.set(Field::WindDirection, Measurement::new(Some(8), Remark::Normal));
        record
    }

    #[test]
    fn test_masking_keeps_remarks() {
        let records = vec![
            record(1, 2, Some(100), Remark::Normal),
            record(1, 1, Some(0), Remark::NotObserved),
        ];

        let masked = SeriesTable::from_records("Chiba", &records, Some(&MaskPolicy::default()));
        let raw = SeriesTable::from_records("Chiba", &records, None);

        assert_eq!(masked.column(Field::Temperature), vec![None, Some(100.0)]);
        assert_eq!(raw.column(Field::Temperature), vec![Some(0.0), Some(100.0)]);
        assert_eq!(masked.rows[0].remark(Field::Temperature), Some(Remark::NotObserved));
    }

    #[test]
    fn test_physical_wind_components() {
        let records = vec![record(1, 1, Some(100), Remark::Normal)];
        let table = SeriesTable::from_records("Chiba", &records, None).to_physical();
        let row = &table.rows[0];

        // code 8 (south): bearing (-90 - 180) mod 360 = 90
        assert!((row.value(Field::WindDirection).unwrap() - 90.0).abs() < 1e-9);
        assert!(row.u.unwrap().abs() < 1e-9);
        assert!((row.v.unwrap() - 3.0).abs() < 1e-9);
        assert!((row.value(Field::Temperature).unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(table.units, Units::Physical);
    }

    #[test]
    fn test_clip_is_closed_interval() {
        let records: Vec<_> = (1..=5)
            .map(|h| record(1, h, Some(h as i32), Remark::Normal))
            .collect();
        let table = SeriesTable::from_records("Chiba", &records, None);
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap().and_hms_opt(2, 0, 0).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap().and_hms_opt(4, 0, 0).unwrap();

        let clipped = table.clip(start, end);
        assert_eq!(clipped.len(), 3);
        assert!(clipped.find(start).is_some());
        assert!(clipped.find(end).is_some());
    }
}
