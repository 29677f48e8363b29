use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cli::args::{Cli, Commands, ConvertArgs, StationArgs};
use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::models::field::{Field, MaskPolicy};
use crate::models::remark::Remark;
use crate::models::station::{StationCatalog, StationMetadata};
use crate::processors::reconstructor::Reconstruction;
use crate::processors::{
    ArchiveVerifier, ConversionJob, IntegrityChecker, ParallelProcessor, TimeSeriesReconstructor,
};
use crate::readers::{ArchiveReader, SourceFormat};
use crate::utils::filename::series_file_name;
use crate::utils::progress::ProgressReporter;
use crate::writers::{ArchiveWriter, SeriesWriter};

pub fn run(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;

    match cli.command {
        Commands::ConvertObsdl(args) => convert(args, SourceFormat::Obsdl, quiet),
        Commands::ConvertEtrn(args) => convert(args, SourceFormat::Etrn, quiet),

        Commands::Reconstruct {
            station,
            start,
            end,
            archive_root,
            output_dir,
            all_views,
            no_boundary_probe,
            mask_estimated,
            precision,
            json,
            max_workers,
        } => {
            let settings = Settings::load()?;
            let start = parse_window_bound(&start)?;
            let end = parse_window_bound(&end)?;
            let archive_root = archive_root.unwrap_or_else(|| settings.gwo_hourly_dir());

            let policy = if mask_estimated {
                Field::ALL.iter().fold(MaskPolicy::new(), |policy, field| {
                    let mut remarks = policy.remarks_for(*field).to_vec();
                    remarks.push(Remark::Estimated);
                    policy.with_field(*field, &remarks)
                })
            } else {
                MaskPolicy::new()
            };

            let jobs = station
                .iter()
                .map(|s| {
                    TimeSeriesReconstructor::new(&archive_root, s, start, end).map(|r| {
                        r.with_mask_policy(policy.clone())
                            .with_boundary_probe(!no_boundary_probe)
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let progress = ProgressReporter::new(jobs.len() as u64, "Reconstructing...", quiet);
            let processor = ParallelProcessor::new(max_workers.unwrap_or(settings.max_workers));
            let results = processor.reconstruct_all(&jobs, Some(&progress))?;

            let mut writer = SeriesWriter::new();
            if let Some(p) = precision {
                writer = writer.with_precision(p);
            }

            let mut failures = Vec::new();
            for (job, result) in jobs.iter().zip(results) {
                match result {
                    Ok(reconstruction) => {
                        write_views(&writer, &reconstruction, &output_dir, all_views)?;
                        if json {
                            println!("{}", to_json(&reconstruction.stats)?);
                        } else {
                            progress.println(&reconstruction.stats.summary());
                        }
                    }
                    Err(e) => failures.push(format!("{}: {}", job.station(), e)),
                }
            }

            if !failures.is_empty() {
                return Err(ProcessingError::MissingData(failures.join("; ")));
            }
            Ok(())
        }

        Commands::Verify {
            converted,
            reference,
            json,
        } => {
            let report = ArchiveVerifier::new().verify_files(&converted, &reference)?;

            if json {
                println!("{}", to_json(&report)?);
            } else {
                println!("{}", report.summary());
            }

            if report.core_data_matches() {
                Ok(())
            } else {
                let columns: Vec<&str> = report
                    .unexpected_differences()
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect();
                Err(ProcessingError::Verification(format!(
                    "unexpected differences in {}",
                    columns.join(", ")
                )))
            }
        }

        Commands::Check { files, json } => {
            let reader = ArchiveReader::new();
            let mut records = Vec::new();
            for path in &files {
                let contents = reader.read_archive(path)?;
                if !contents.corrupt_rows.is_empty() {
                    warn!(
                        "{}: {} corrupt row(s) not checked",
                        path.display(),
                        contents.corrupt_rows.len()
                    );
                }
                records.extend(contents.records);
            }

            let checker = IntegrityChecker::new();
            let report = checker.check(&records);

            if json {
                println!("{}", to_json(&report)?);
            } else {
                println!("{}", checker.generate_summary(&report));
            }

            if report.is_clean() {
                println!("All records passed integrity checks");
            } else {
                println!("Found {} integrity issue(s)", report.violations.len());
            }
            Ok(())
        }

        Commands::Config => {
            let settings = Settings::load()?;
            println!("{}", settings.describe());
            Ok(())
        }
    }
}

fn convert(args: ConvertArgs, format: SourceFormat, quiet: bool) -> Result<()> {
    let settings = Settings::load()?;
    let station = resolve_station(&args.station, &settings)?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| settings.jma_download_dir.clone());

    info!(
        "Converting {} file(s) for {} ({}) into {}",
        args.inputs.len(),
        station.name_en,
        station.code,
        output_dir.display()
    );

    let progress = ProgressReporter::new_spinner("Converting source files...", quiet);
    let processor = ParallelProcessor::new(args.max_workers.unwrap_or(settings.max_workers))
        .with_mmap(args.mmap)
        .with_cloud_interpolation(!args.no_cloud_interpolation);

    let job = ConversionJob {
        station: station.clone(),
        files: args.inputs.clone(),
        format,
    };
    let outputs = processor.convert_all(&[job], Some(&progress))?;

    let writer = ArchiveWriter::new();
    let checker = IntegrityChecker::new();

    for output in &outputs {
        for (year, records) in output.by_year() {
            let path = writer.write_year(&output_dir, &station.name_en, year, &records)?;
            progress.println(&format!("Wrote {} rows to {}", records.len(), path.display()));

            for remark in station.remarks_for_year(year) {
                progress.println(&format!("  {} {}: {}", station.name_en, year, remark.note));
            }
        }

        let report = checker.check(&output.records);
        if !report.is_clean() {
            warn!(
                "{}: {} integrity issue(s) in converted records",
                station.name_en,
                report.violations.len()
            );
        }

        if args.json {
            println!("{}", to_json(&output.stats)?);
        } else {
            progress.println(&output.stats.summary());
        }
    }

    Ok(())
}

fn resolve_station(args: &StationArgs, settings: &Settings) -> Result<StationMetadata> {
    let catalog = args.catalog.as_ref().or(settings.station_catalog.as_ref());

    if let Some(path) = catalog {
        let catalog = StationCatalog::from_json_file(path)?;
        return catalog.find(&args.station).cloned();
    }

    match &args.code {
        Some(code) => Ok(StationMetadata::new(
            code.clone(),
            args.name.clone().unwrap_or_else(|| args.station.clone()),
            args.station.clone(),
        )),
        None => Err(ProcessingError::StationNotFound(format!(
            "{} (pass --catalog or --code)",
            args.station
        ))),
    }
}

fn write_views(
    writer: &SeriesWriter,
    reconstruction: &Reconstruction,
    output_dir: &Path,
    all_views: bool,
) -> Result<()> {
    let stats = &reconstruction.stats;
    let name = series_file_name(&stats.station, stats.start, stats.end);

    let mut views = vec![("", &reconstruction.hourly)];
    if all_views {
        views.push(("masked_", &reconstruction.masked));
        views.push(("raw_", &reconstruction.raw));
        views.push(("interpolated_", &reconstruction.interpolated));
    }

    for (prefix, table) in views {
        let path: PathBuf = output_dir.join(format!("{}{}", prefix, name));
        writer.write_table(table, &path)?;
        info!("Wrote {} rows to {}", table.len(), path.display());
    }

    Ok(())
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` or the `T`-separated form.
pub fn parse_window_bound(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(t);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")?
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("invalid window bound {}", text)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ProcessingError::InvalidFormat(format!("JSON encoding: {}", e)))
}
