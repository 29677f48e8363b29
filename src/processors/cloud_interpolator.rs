use tracing::debug;

use crate::models::field::Field;
use crate::models::observation::ObservationRecord;
use crate::models::remark::Remark;
use crate::processors::interpolation::fill_time_gaps;
use crate::utils::constants::{CLOUD_MAX, CLOUD_MIN, CLOUD_OBSERVATION_HOURS};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloudSummary {
    pub observed: usize,
    pub interpolated: usize,
}

/// Fills hourly cloud cover between the 3-hourly observations.
#[derive(Debug, Clone, Default)]
pub struct CloudInterpolator;

impl CloudInterpolator {
    pub fn new() -> Self {
        Self
    }

    pub fn is_observation_hour(hour: u32) -> bool {
        CLOUD_OBSERVATION_HOURS.contains(&hour)
    }

    /// Interpolates cloud cover in place; `records` must be in time order.
    pub fn interpolate(&self, records: &mut [ObservationRecord]) -> CloudSummary {
        let times: Vec<_> = records.iter().map(ObservationRecord::timestamp).collect();
        let mut values: Vec<Option<f64>> = records
            .iter()
            .map(|r| r.value(Field::CloudCover).map(f64::from))
            .collect();

        let observed = values.iter().filter(|v| v.is_some()).count();
        let fill = vec![true; values.len()];
        fill_time_gaps(&times, &mut values, &fill);

        // leading run before the first observation takes the first anchor
        if let Some(first) = values.iter().position(Option::is_some) {
            let anchor = values[first];
            values[..first].iter_mut().for_each(|v| *v = anchor);
        }

        let mut summary = CloudSummary {
            observed,
            interpolated: 0,
        };

        for (record, value) in records.iter_mut().zip(values) {
            let was_null = record.value(Field::CloudCover).is_none();
            let filled = value
                .map(|v| v.round().clamp(CLOUD_MIN, CLOUD_MAX) as i32)
                .unwrap_or(0);

            let hour = record.hour;
            let measurement = record.measurement_mut(Field::CloudCover);
            measurement.value = Some(filled);
            if !Self::is_observation_hour(hour) {
                measurement.remark = Remark::NotObserved;
            }
            if was_null {
                summary.interpolated += 1;
            }
        }

        debug!(
            "Cloud cover: {} observed, {} interpolated",
            summary.observed, summary.interpolated
        );

        summary
    }
}
