use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

use crate::error::{ProcessingError, Result};
use crate::models::station::StationMetadata;
use crate::processors::converter::{ConversionOutput, GwoConverter};
use crate::processors::reconstructor::{Reconstruction, TimeSeriesReconstructor};
use crate::readers::{SourceFormat, SourceRows};
use crate::utils::progress::ProgressReporter;

/// All downloaded files of one station, converted together so that
/// cloud interpolation and duplicate removal span file boundaries.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub station: StationMetadata,
    pub files: Vec<PathBuf>,
    pub format: SourceFormat,
}

pub struct ParallelProcessor {
    max_workers: usize,
    use_mmap: bool,
    interpolate_cloud: bool,
}

impl ParallelProcessor {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            use_mmap: false,
            interpolate_cloud: true,
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn with_cloud_interpolation(mut self, interpolate_cloud: bool) -> Self {
        self.interpolate_cloud = interpolate_cloud;
        self
    }

    fn pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(config::ConfigError::Message(e.to_string())))
    }

    /// Converts each station's source files; any unreadable file fails the run.
    pub fn convert_all(
        &self,
        jobs: &[ConversionJob],
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<ConversionOutput>> {
        let processed = AtomicUsize::new(0);

        if let Some(p) = progress {
            p.set_message(&format!("Converting {} station(s)...", jobs.len()));
        }

        let pool = self.pool()?;
        let outputs: Result<Vec<ConversionOutput>> = pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    let result = self.convert_job(job);

                    processed.fetch_add(1, Ordering::Relaxed);
                    if let Some(p) = progress {
                        p.increment(1);
                    }

                    result
                })
                .collect()
        });
        let outputs = outputs?;

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Converted {} station(s)",
                processed.load(Ordering::Relaxed)
            ));
        }

        Ok(outputs)
    }

    fn convert_job(&self, job: &ConversionJob) -> Result<ConversionOutput> {
        let per_file: Result<Vec<SourceRows>> = job
            .files
            .par_iter()
            .map(|path| job.format.read_file(path, self.use_mmap))
            .collect();

        let mut rows = SourceRows::default();
        for file_rows in per_file? {
            rows.extend(file_rows);
        }

        info!(
            "{}: read {} row(s) from {} file(s)",
            job.station.name_en,
            rows.observations.len(),
            job.files.len()
        );

        Ok(GwoConverter::new(job.station.clone())
            .with_cloud_interpolation(self.interpolate_cloud)
            .convert_rows(&rows))
    }

    /// Runs independent reconstructions; one failing window does not stop the others.
    pub fn reconstruct_all(
        &self,
        jobs: &[TimeSeriesReconstructor],
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<Result<Reconstruction>>> {
        if let Some(p) = progress {
            p.set_message(&format!("Reconstructing {} series...", jobs.len()));
        }

        let pool = self.pool()?;
        let results: Vec<Result<Reconstruction>> = pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    let result = job.reconstruct();
                    if let Err(ref e) = result {
                        warn!("{}: reconstruction failed: {}", job.station(), e);
                    }
                    if let Some(p) = progress {
                        p.increment(1);
                    }
                    result
                })
                .collect()
        });

        if let Some(p) = progress {
            let failed = results.iter().filter(|r| r.is_err()).count();
            p.finish_with_message(&format!(
                "Reconstructed {} series ({} failed)",
                results.len() - failed,
                failed
            ));
        }

        Ok(results)
    }
}

impl Default for ParallelProcessor {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}
