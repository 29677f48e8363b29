/// Archive layout
pub const ARCHIVE_COLUMN_COUNT: usize = 33;
pub const ARCHIVE_EXTENSION: &str = "csv";

/// Hours at which cloud cover is observed directly
pub const CLOUD_OBSERVATION_HOURS: [u32; 8] = [3, 6, 9, 12, 15, 18, 21, 24];

/// Cloud cover constraints (tenths of sky)
pub const CLOUD_MIN: f64 = 0.0;
pub const CLOUD_MAX: f64 = 10.0;

/// Source file layouts
pub const OBSDL_HEADER_LINES: usize = 6;
pub const OBSDL_MIN_COLUMNS: usize = 38;
pub const ETRN_MIN_COLUMNS: usize = 20;

/// Verification thresholds
pub const SOLAR_TOLERANCE: i64 = 1;
pub const SIGNIFICANT_DIFF_PERCENT: f64 = 1.0;

/// Environment-driven directory defaults
pub const DEFAULT_DATA_DIR: &str = "/mnt/d/Data";
pub const DEFAULT_DOWNLOAD_DIR: &str = "./jma_data";
pub const JMA_DATABASE_SUBDIR: &str = "met/JMA_DataBase";
pub const GWO_HOURLY_SUBDIR: &str = "GWO/Hourly";
pub const CONFIG_FILE_NAME: &str = "gwo-processor";

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
