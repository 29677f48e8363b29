use chrono::NaiveDate;
use clap::Parser;
use gwo_processor::cli::args::Commands;
use gwo_processor::cli::Cli;
use gwo_processor::models::{Field, Measurement, Remark, StationCatalog, StationMetadata};
use gwo_processor::processors::{
    ArchiveVerifier, ConversionJob, GwoConverter, IntegrityChecker, ParallelProcessor,
    TimeSeriesReconstructor,
};
use gwo_processor::readers::{ArchiveReader, EtrnReader, ObsdlReader, SourceFormat};
use gwo_processor::writers::{ArchiveWriter, SeriesWriter};
use gwo_processor::ProcessingError;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;
use validator::Validate;

fn chiba() -> StationMetadata {
    StationMetadata::new("682".to_string(), "千葉".to_string(), "Chiba".to_string())
}

fn at(y: i32, m: u32, d: u32, h: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

/// One day of the hourly table: cloud observed every third hour, a missing
/// temperature at 05:00 and an estimated one at 07:00.
fn etrn_day(year: i32, month: u32, day: u32) -> String {
    let mut out = String::from(
        "時,現地,海面,降水量,気温,露点温度,蒸気圧,湿度,風速,風向,日照時間,全天日射量,降雪,積雪,天気,雲量,視程,年,月,日\n",
    );
    for hour in 1..=24u32 {
        let temp = match hour {
            5 => "///".to_string(),
            7 => format!("{:.1})", 2.0 + hour as f64 * 0.5),
            _ => format!("{:.1}", 2.0 + hour as f64 * 0.5),
        };
        let cloud = match hour {
            3 => "10-",
            6 => "4",
            9 => "1",
            12 => "0+",
            15 => "7",
            18 => "9",
            21 => "10",
            24 => "5",
            _ => "",
        };
        let sunshine = if (7..=16).contains(&hour) { "0.6" } else { "" };
        out.push_str(&format!(
            "{},1008.4,1012.0,--,{},-3.1,4.9,54,3.0,南,{},1.23,--,--,,{},20.0,{},{},{}\n",
            hour, temp, sunshine, cloud, year, month, day
        ));
    }
    out
}

#[test]
fn test_etrn_convert_write_reconstruct() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let source = temp_dir.path().join("chiba_20230101.csv");
    fs::write(&source, etrn_day(2023, 1, 1)).unwrap();

    let rows = EtrnReader::new().read_file(&source).unwrap();
    assert!(rows.skipped.is_empty());
    assert_eq!(rows.observations.len(), 24);

    let output = GwoConverter::new(chiba()).convert_rows(&rows);
    assert_eq!(output.records.len(), 24);
    assert_eq!(output.stats.cloud_observed, 8);
    assert_eq!(output.stats.cloud_interpolated, 16);

    let first = &output.records[0];
    assert_eq!(first.value(Field::LocalPressure), Some(10084));
    assert_eq!(first.measurement(Field::Precipitation), &Measurement::new(Some(0), Remark::NoPhenomenon));
    assert_eq!(first.measurement(Field::Sunshine), &Measurement::new(Some(0), Remark::NotObserved));
    assert_eq!(first.value(Field::WindDirection), Some(8));
    assert_eq!(output.records[4].measurement(Field::Temperature), &Measurement::new(None, Remark::Missing));
    assert_eq!(output.records[6].remark(Field::Temperature), Remark::Estimated);
    // interpolated between 10 at 03:00 and 4 at 06:00
    assert_eq!(output.records[3].value(Field::CloudCover), Some(8));
    assert_eq!(output.records[4].value(Field::CloudCover), Some(6));

    let report = IntegrityChecker::new().check(&output.records);
    assert!(report.is_clean(), "{:?}", report.violations);

    let archive_root = temp_dir.path().join("GWO").join("Hourly");
    let writer = ArchiveWriter::new();
    for (year, records) in output.by_year() {
        writer.write_year(&archive_root, "Chiba", year, &records).unwrap();
    }

    let archive = archive_root.join("Chiba").join("Chiba2023.csv");
    let contents = ArchiveReader::new().read_archive(&archive).unwrap();
    assert_eq!(contents.records, output.records);

    let result = TimeSeriesReconstructor::new(&archive_root, "Chiba", at(2023, 1, 1, 1), at(2023, 1, 1, 23))
        .unwrap()
        .reconstruct()
        .unwrap();

    assert_eq!(result.hourly.len(), 23);
    assert_eq!(result.stats.missing_boundary_years, vec![2022, 2024]);

    // missing 05:00 is filled from 04:00 (4.0) and 06:00 (5.0)
    let five = result.hourly.find(at(2023, 1, 1, 5)).unwrap();
    assert!((five.value(Field::Temperature).unwrap() - 4.5).abs() < 1e-9);
    assert_eq!(five.remark(Field::Temperature), Some(Remark::Missing));
    assert_eq!(result.masked.find(at(2023, 1, 1, 5)).unwrap().value(Field::Temperature), None);

    // physical units: hPa, fraction, W/m2; south wind blows northward
    let one = result.hourly.find(at(2023, 1, 1, 1)).unwrap();
    assert!((one.value(Field::LocalPressure).unwrap() - 1008.4).abs() < 1e-9);
    assert!((one.value(Field::Humidity).unwrap() - 0.54).abs() < 1e-9);
    assert!((one.value(Field::Solar).unwrap() - 123.0 * 1e4 / 3.6e3).abs() < 1e-6);
    assert!(one.u.unwrap().abs() < 1e-9);
    assert!((one.v.unwrap() - 3.0).abs() < 1e-9);

    let series_path = temp_dir.path().join("chiba.csv");
    SeriesWriter::new().write_table(&result.hourly, &series_path).unwrap();
    let text = fs::read_to_string(&series_path).unwrap();
    assert_eq!(text.lines().count(), 24);
}

#[test]
fn test_parallel_conversion_matches_sequential() {
    let temp_dir = TempDir::new().unwrap();
    let day1 = temp_dir.path().join("d1.csv");
    let day2 = temp_dir.path().join("d2.csv");
    fs::write(&day1, etrn_day(2022, 12, 31)).unwrap();
    fs::write(&day2, etrn_day(2023, 1, 1)).unwrap();

    let job = ConversionJob {
        station: chiba(),
        files: vec![day2.clone(), day1.clone()],
        format: SourceFormat::Etrn,
    };
    let parallel = ParallelProcessor::new(4).convert_all(&[job], None).unwrap();

    let mut rows = EtrnReader::new().read_file(&day1).unwrap();
    rows.extend(EtrnReader::new().read_file(&day2).unwrap());
    let sequential = GwoConverter::new(chiba()).convert_rows(&rows);

    assert_eq!(parallel[0].records, sequential.records);

    let years = sequential.by_year();
    assert_eq!(years[&2022].len(), 24);
    assert_eq!(years[&2023].len(), 24);
    assert_eq!(years[&2022].last().unwrap().hour, 24);
}

#[test]
fn test_obsdl_conversion() {
    let header = "ダウンロードした時刻：2024/01/15 10:00:00\n\n,千葉\n年月日時\n,\n,品質情報\n";
    let row = |timestamp: &str, temp: &str, quality: &str| {
        format!(
            "{},1008.4,8,1,1005.0,8,1,0.0,1,8,1,{},{},1,-3.1,8,1,4.9,8,1,54,8,1,3.1,8,静穏,8,1,,0,0,1,,0,1,10-,8,1",
            timestamp, temp, quality
        )
    };
    let content = format!(
        "{}{}\n{}\n{}\n",
        header,
        row("2024/1/1 1:00:00", "5.2", "8"),
        row("2024/1/1 2:00:00", "", "1"),
        row("2024/1/2 0:00:00", "4.0", "5")
    );

    let rows = ObsdlReader::new().parse_content(&content);
    assert_eq!(rows.observations.len(), 3);

    let output = GwoConverter::new(chiba())
        .with_cloud_interpolation(false)
        .convert_rows(&rows);
    let records = &output.records;

    assert_eq!(records[0].measurement(Field::Temperature), &Measurement::new(Some(52), Remark::Normal));
    assert_eq!(records[1].measurement(Field::Temperature), &Measurement::new(None, Remark::Missing));
    assert_eq!(records[2].hour, 24);
    assert_eq!(records[2].measurement(Field::Temperature), &Measurement::new(Some(40), Remark::Estimated));
    assert_eq!(records[0].measurement(Field::Precipitation), &Measurement::new(Some(0), Remark::NoPhenomenon));
    assert_eq!(records[0].measurement(Field::Sunshine), &Measurement::new(Some(0), Remark::NotObserved));
    assert_eq!(records[0].value(Field::WindDirection), Some(0));
    assert_eq!(records[0].value(Field::CloudCover), Some(10));
    assert_eq!(output.stats.field(Field::Temperature).missing, 1);
}

#[test]
fn test_verify_reports_reference_cloud_defect() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("src.csv");
    fs::write(&source, etrn_day(2019, 7, 1)).unwrap();

    let rows = EtrnReader::new().read_file(&source).unwrap();
    let converted = GwoConverter::new(chiba()).convert_rows(&rows).records;
    let legacy = GwoConverter::new(chiba())
        .with_cloud_interpolation(false)
        .convert_rows(&rows)
        .records
        .into_iter()
        .map(|mut r| {
            if r.remark(Field::CloudCover) == Remark::NotObserved {
                r.set(Field::CloudCover, Measurement::new(Some(0), Remark::NotObserved));
            }
            r
        })
        .collect::<Vec<_>>();

    let writer = ArchiveWriter::new();
    let converted_path = writer.write_year(&temp_dir.path().join("new"), "Chiba", 2019, &converted).unwrap();
    let reference_path = writer.write_year(&temp_dir.path().join("old"), "Chiba", 2019, &legacy).unwrap();

    let report = ArchiveVerifier::new()
        .verify_files(&converted_path, &reference_path)
        .unwrap();

    assert!(report.has_cloud_defect());
    assert_eq!(report.cloud_defect_rows, 16);
    assert!(report.core_data_matches());
}

#[test]
fn test_missing_year_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let writer = ArchiveWriter::new();
    let records = GwoConverter::new(chiba())
        .convert(&EtrnReader::new().parse_content(&etrn_day(2020, 6, 1)).observations)
        .records;
    writer.write_year(temp_dir.path(), "Chiba", 2020, &records).unwrap();

    let err = TimeSeriesReconstructor::new(temp_dir.path(), "Chiba", at(2020, 6, 1, 1), at(2021, 6, 1, 1))
        .unwrap()
        .reconstruct()
        .unwrap_err();
    assert!(matches!(err, ProcessingError::ArchiveNotFound { year: 2021, .. }));

    let err = TimeSeriesReconstructor::new(temp_dir.path(), "Tokyo", at(2020, 6, 1, 1), at(2020, 6, 2, 1))
        .unwrap()
        .reconstruct()
        .unwrap_err();
    assert!(matches!(err, ProcessingError::NoArchives { .. }));
}

#[test]
fn test_station_catalog_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("stations.json");
    fs::write(
        &path,
        r#"{"stations": {"Chiba": {"code": "682", "name": "千葉", "name_en": "Chiba",
            "remarks": [{"note": "moved 1966", "start_date": null, "end_date": "1966-03-31", "source": null}]}}}"#,
    )
    .unwrap();

    let catalog = StationCatalog::from_json_file(&path).unwrap();
    let station = catalog.find("CHIBA").unwrap();
    assert!(station.validate().is_ok());
    assert_eq!(station.remarks_for_year(1960).len(), 1);
    assert!(station.remarks_for_year(1970).is_empty());
}

#[test]
fn test_cli_parsing() {
    let cli = Cli::try_parse_from([
        "gwo-processor",
        "reconstruct",
        "--station",
        "Tokyo",
        "--station",
        "Chiba",
        "--start",
        "2014-01-01",
        "--end",
        "2014-12-31 23:00",
        "--all-views",
    ])
    .unwrap();

    match cli.command {
        Commands::Reconstruct {
            station, all_views, ..
        } => {
            assert_eq!(station, vec!["Tokyo".to_string(), "Chiba".to_string()]);
            assert!(all_views);
        }
        _ => panic!("expected reconstruct"),
    }

    let cli = Cli::try_parse_from([
        "gwo-processor",
        "convert-etrn",
        "--station",
        "Chiba",
        "--code",
        "682",
        "a.csv",
        "b.csv",
    ])
    .unwrap();
    assert!(matches!(cli.command, Commands::ConvertEtrn(ref args) if args.inputs.len() == 2));

    assert!(Cli::try_parse_from(["gwo-processor", "convert-obsdl", "--station", "Chiba"]).is_err());
}
