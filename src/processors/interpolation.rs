//! Time-weighted interpolation primitives over irregular timestamps.
//!
//! All functions expect `times` sorted ascending. Cells after the last
//! known value hold that value; cells before the first known value stay
//! null.

use chrono::{Duration, NaiveDateTime};

fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64
}

/// Linear interpolation between two anchors, weighted by elapsed time.
pub fn interpolate_between(
    t0: NaiveDateTime,
    v0: f64,
    t1: NaiveDateTime,
    v1: f64,
    t: NaiveDateTime,
) -> f64 {
    let span = seconds_between(t0, t1);
    if span <= 0.0 {
        return v0;
    }
    v0 + (v1 - v0) * seconds_between(t0, t) / span
}

/// Fills null cells flagged in `fill` from the surrounding non-null cells.
/// Returns the number of cells filled.
pub fn fill_time_gaps(times: &[NaiveDateTime], values: &mut [Option<f64>], fill: &[bool]) -> usize {
    let anchors: Vec<(NaiveDateTime, f64)> = times
        .iter()
        .zip(values.iter())
        .filter_map(|(t, v)| v.map(|v| (*t, v)))
        .collect();

    let mut filled = 0;
    for (i, value) in values.iter_mut().enumerate() {
        if value.is_some() || !fill.get(i).copied().unwrap_or(false) {
            continue;
        }
        *value = value_at(&anchors, times[i], false);
        if value.is_some() {
            filled += 1;
        }
    }

    filled
}

/// Samples a series at each grid instant; native values are reproduced exactly.
pub fn sample_at(
    times: &[NaiveDateTime],
    values: &[Option<f64>],
    grid: &[NaiveDateTime],
) -> Vec<Option<f64>> {
    let anchors: Vec<(NaiveDateTime, f64)> = times
        .iter()
        .zip(values)
        .filter_map(|(t, v)| v.map(|v| (*t, v)))
        .collect();

    grid.iter().map(|t| value_at(&anchors, *t, true)).collect()
}

fn value_at(anchors: &[(NaiveDateTime, f64)], t: NaiveDateTime, exact: bool) -> Option<f64> {
    let next = anchors.partition_point(|(at, _)| *at < t);

    if exact {
        if let Some((at, v)) = anchors.get(next) {
            if *at == t {
                return Some(*v);
            }
        }
    }

    match (next.checked_sub(1).and_then(|p| anchors.get(p)), anchors.get(next)) {
        (Some(&(t0, v0)), Some(&(t1, v1))) => Some(interpolate_between(t0, v0, t1, v1, t)),
        (Some(&(_, v0)), None) => Some(v0),
        _ => None,
    }
}

/// Latest non-null value at or before each grid instant.
pub fn forward_fill<T: Clone>(
    times: &[NaiveDateTime],
    values: &[Option<T>],
    grid: &[NaiveDateTime],
) -> Vec<Option<T>> {
    let known: Vec<(NaiveDateTime, &T)> = times
        .iter()
        .zip(values)
        .filter_map(|(t, v)| v.as_ref().map(|v| (*t, v)))
        .collect();

    grid.iter()
        .map(|t| {
            let upto = known.partition_point(|(at, _)| at <= t);
            upto.checked_sub(1).map(|i| known[i].1.clone())
        })
        .collect()
}

/// Hourly instants covering `[start, end]`.
pub fn hourly_grid(start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
    let mut grid = Vec::new();
    let mut t = start;
    while t <= end {
        grid.push(t);
        t += Duration::hours(1);
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
            + Duration::hours(hour)
    }

    #[test]
    fn test_fill_time_gaps_weights_by_time() {
        let times = vec![at(0), at(1), at(4)];
        let mut values = vec![Some(10.0), None, Some(50.0)];
        let filled = fill_time_gaps(&times, &mut values, &[false, true, false]);

        assert_eq!(filled, 1);
        assert_eq!(values[1], Some(20.0));
    }

    #[test]
    fn test_fill_only_flagged_cells() {
        let times = vec![at(0), at(1), at(2), at(3)];
        let mut values = vec![Some(0.0), None, None, Some(30.0)];
        fill_time_gaps(&times, &mut values, &[false, true, false, false]);

        assert_eq!(values, vec![Some(0.0), Some(10.0), None, Some(30.0)]);
    }

    #[test]
    fn test_fill_edges() {
        let times = vec![at(0), at(1), at(2), at(3)];
        let mut values = vec![None, Some(5.0), None, None];
        fill_time_gaps(&times, &mut values, &[true; 4]);

        assert_eq!(values, vec![None, Some(5.0), Some(5.0), Some(5.0)]);
    }

    #[test]
    fn test_sample_reproduces_anchors_and_is_monotonic() {
        let times = vec![at(0), at(3), at(6)];
        let values = vec![Some(100.0), Some(130.0), Some(70.0)];
        let grid = hourly_grid(at(0), at(6));
        let sampled = sample_at(&times, &values, &grid);

        assert_eq!(sampled.len(), 7);
        assert_eq!(sampled[0], Some(100.0));
        assert_eq!(sampled[3], Some(130.0));
        assert_eq!(sampled[6], Some(70.0));
        assert!(sampled[0] < sampled[1] && sampled[1] < sampled[2] && sampled[2] < sampled[3]);
        assert!(sampled[3] > sampled[4] && sampled[4] > sampled[5] && sampled[5] > sampled[6]);
        assert_eq!(sampled[1], Some(110.0));
        assert_eq!(sampled[5], Some(90.0));
    }

    #[test]
    fn test_forward_fill() {
        let times = vec![at(0), at(3), at(6)];
        let values = vec![Some(8u8), None, Some(5u8)];
        let grid = vec![at(-1), at(0), at(2), at(4), at(6), at(7)];

        assert_eq!(
            forward_fill(&times, &values, &grid),
            vec![None, Some(8), Some(8), Some(8), Some(5), Some(5)]
        );
    }

    #[test]
    fn test_hourly_grid_is_inclusive() {
        let grid = hourly_grid(at(0), at(3));
        assert_eq!(grid, vec![at(0), at(1), at(2), at(3)]);
        assert!(hourly_grid(at(3), at(0)).is_empty());
    }
}
