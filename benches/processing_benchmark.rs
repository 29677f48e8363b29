use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gwo_processor::models::{Field, RawObservation, RawSignal, StationMetadata};
use gwo_processor::processors::quality_normalizer::normalize;
use gwo_processor::processors::{CloudInterpolator, GwoConverter, IntegrityChecker, RowEncoder, TimeSeriesReconstructor};
use gwo_processor::writers::ArchiveWriter;
use tempfile::TempDir;

fn station() -> StationMetadata {
    StationMetadata::new("662".to_string(), "東京".to_string(), "Tokyo".to_string())
}

// Synthetic hourly rows with the usual mix of markers
fn create_raw_rows(days: usize) -> Vec<RawObservation> {
    let base = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let mut rows = Vec::with_capacity(days * 24);

    for day in 0..days {
        let date = base + Duration::days(day as i64);
        for hour in 1..=24u32 {
            let temp = 5.0 + (hour as f64) * 0.3;
            let temp = if hour % 7 == 0 {
                format!("{:.1})", temp)
            } else {
                format!("{:.1}", temp)
            };
            let cloud = if hour % 3 == 0 { "7" } else { "" };
            let sunshine = if (7..=17).contains(&hour) { "0.5" } else { "" };

            rows.push(
                RawObservation::new(date, hour)
                    .with_signal(Field::LocalPressure, RawSignal::symbol("1008.4"))
                    .with_signal(Field::SeaPressure, RawSignal::symbol("1012.1"))
                    .with_signal(Field::Precipitation, RawSignal::symbol("--"))
                    .with_signal(Field::Temperature, RawSignal::symbol(&temp))
                    .with_signal(Field::DewPoint, RawSignal::symbol("-2.1"))
                    .with_signal(Field::VaporPressure, RawSignal::symbol("5.2"))
                    .with_signal(Field::Humidity, RawSignal::symbol("54"))
                    .with_signal(Field::WindSpeed, RawSignal::symbol("3.4"))
                    .with_signal(Field::WindDirection, RawSignal::symbol("北北西"))
                    .with_signal(Field::Sunshine, RawSignal::symbol(sunshine))
                    .with_signal(Field::Solar, RawSignal::symbol("///"))
                    .with_signal(Field::CloudCover, RawSignal::symbol(cloud)),
            );
        }
    }

    rows
}

fn benchmark_normalizer(c: &mut Criterion) {
    let signals = vec![
        RawSignal::symbol("1008.4"),
        RawSignal::symbol("5.2)"),
        RawSignal::symbol("--"),
        RawSignal::symbol("///"),
        RawSignal::symbol(""),
        RawSignal::numeric(Some("0.0"), Some("8"), Some("1")),
        RawSignal::numeric(Some("12.5"), Some("5"), None),
    ];

    c.bench_function("quality_normalizer", |b| {
        b.iter(|| {
            let mut usable = 0;
            for signal in &signals {
                if normalize(black_box(signal)).value.is_some() {
                    usable += 1;
                }
            }
            black_box(usable)
        })
    });
}

fn benchmark_row_encoder(c: &mut Criterion) {
    let rows = create_raw_rows(7);
    let encoder = RowEncoder::new(station());

    c.bench_function("row_encoder_week", |b| {
        b.iter(|| {
            let encoded: Vec<_> = rows.iter().map(|row| encoder.encode(row)).collect();
            black_box(encoded.len())
        })
    });
}

fn benchmark_cloud_interpolation(c: &mut Criterion) {
    let encoder = RowEncoder::new(station());
    let records: Vec<_> = create_raw_rows(31)
        .iter()
        .map(|row| encoder.encode(row).record)
        .collect();

    c.bench_function("cloud_interpolation_month", |b| {
        b.iter(|| {
            let mut batch = records.clone();
            let summary = CloudInterpolator::new().interpolate(&mut batch);
            black_box(summary.interpolated)
        })
    });
}

fn benchmark_integrity_checker(c: &mut Criterion) {
    let output = GwoConverter::new(station()).convert(&create_raw_rows(31));

    c.bench_function("integrity_checker_month", |b| {
        b.iter(|| {
            let report = IntegrityChecker::new().check(&output.records);
            black_box(report.total_records)
        })
    });
}

fn benchmark_reconstruction_by_window(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let output = GwoConverter::new(station()).convert(&create_raw_rows(365));
    let writer = ArchiveWriter::new();
    for (year, records) in output.by_year() {
        writer.write_year(dir.path(), "Tokyo", year, &records).unwrap();
    }

    let start = NaiveDate::from_ymd_opt(2023, 2, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let mut group = c.benchmark_group("reconstruction_by_window");
    group.sample_size(20);

    for &days in &[7i64, 30, 120] {
        group.bench_with_input(BenchmarkId::new("days", days), &days, |b, &days| {
            b.iter(|| {
                let result = TimeSeriesReconstructor::new(dir.path(), "Tokyo", start, start + Duration::days(days))
                    .unwrap()
                    .reconstruct()
                    .unwrap();
                black_box(result.hourly.len())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_normalizer,
    benchmark_row_encoder,
    benchmark_cloud_interpolation,
    benchmark_integrity_checker,
    benchmark_reconstruction_by_window
);
criterion_main!(benches);
