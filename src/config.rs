//! Directory settings, from `gwo-processor.toml` (optional) and environment
//! variables such as `DATA_DIR` and `GWO_HOURLY_DIR`.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use validator::Validate;

use crate::error::Result;
use crate::utils::constants::{
    CONFIG_FILE_NAME, DEFAULT_DATA_DIR, DEFAULT_DOWNLOAD_DIR, GWO_HOURLY_SUBDIR,
    JMA_DATABASE_SUBDIR,
};

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct Settings {
    pub data_dir: PathBuf,
    /// Defaults to `data_dir/met/JMA_DataBase`.
    pub jma_database_dir: Option<PathBuf>,
    /// Defaults to `jma_database_dir/GWO/Hourly`.
    pub gwo_hourly_dir: Option<PathBuf>,
    pub jma_download_dir: PathBuf,
    /// Station catalog JSON; stations are then looked up by name or code.
    pub station_catalog: Option<PathBuf>,
    #[validate(range(min = 1, max = 1024))]
    pub max_workers: usize,
}

impl Settings {
    /// Loads settings from the working directory's config file and the environment.
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE_NAME).required(false))
                .add_source(Environment::default().try_parsing(true)),
        )
    }

    fn from_builder(
        builder: config::builder::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let settings: Settings = builder
            .set_default("data_dir", DEFAULT_DATA_DIR)?
            .set_default("jma_download_dir", DEFAULT_DOWNLOAD_DIR)?
            .set_default("max_workers", num_cpus::get() as u64)?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn jma_database_dir(&self) -> PathBuf {
        self.jma_database_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(JMA_DATABASE_SUBDIR))
    }

    /// Root holding one directory of yearly archives per station.
    pub fn gwo_hourly_dir(&self) -> PathBuf {
        self.gwo_hourly_dir
            .clone()
            .unwrap_or_else(|| self.jma_database_dir().join(GWO_HOURLY_SUBDIR))
    }

    pub fn describe(&self) -> String {
        let mark = |path: &PathBuf| if path.is_dir() { "ok" } else { "--" };
        let rows = [
            ("DATA_DIR", self.data_dir.clone()),
            ("JMA_DATABASE_DIR", self.jma_database_dir()),
            ("GWO_HOURLY_DIR", self.gwo_hourly_dir()),
            ("JMA_DOWNLOAD_DIR", self.jma_download_dir.clone()),
        ];

        let mut out = String::from("=== Settings ===\n");
        for (key, path) in &rows {
            out.push_str(&format!("[{}] {:<18} = {}\n", mark(path), key, path.display()));
        }
        if let Some(catalog) = &self.station_catalog {
            out.push_str(&format!("     STATION_CATALOG    = {}\n", catalog.display()));
        }
        out.push_str(&format!("     MAX_WORKERS        = {}\n", self.max_workers));
        out
    }
}
