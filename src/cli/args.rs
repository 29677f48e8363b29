use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gwo-processor")]
#[command(about = "Convert JMA observations to GWO hourly archives and rebuild hourly series")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Suppress progress output")]
    pub quiet: bool,
}

/// Identifies the station a set of source files belongs to.
#[derive(Args, Debug, Clone)]
pub struct StationArgs {
    #[arg(short, long, help = "Station English name (archive directory) or code")]
    pub station: String,

    #[arg(long, help = "Station catalog JSON [default: STATION_CATALOG setting]")]
    pub catalog: Option<PathBuf>,

    #[arg(long, help = "Station code, when no catalog is available")]
    pub code: Option<String>,

    #[arg(long, help = "Station display name, when no catalog is available")]
    pub name: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub station: StationArgs,

    #[arg(required = true, help = "Downloaded source files")]
    pub inputs: Vec<PathBuf>,

    #[arg(
        short,
        long,
        help = "Output root for yearly archives [default: JMA_DOWNLOAD_DIR setting]"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(long, help = "Keep cloud cover only at observation hours")]
    pub no_cloud_interpolation: bool,

    #[arg(long, help = "Print conversion statistics as JSON")]
    pub json: bool,

    #[arg(long, help = "Memory-map input files")]
    pub mmap: bool,

    #[arg(long, help = "Worker threads [default: MAX_WORKERS setting]")]
    pub max_workers: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert numeric-quality CSV downloads to yearly archives
    ConvertObsdl(ConvertArgs),

    /// Convert hourly tables with in-cell quality markers to yearly archives
    ConvertEtrn(ConvertArgs),

    /// Rebuild gap-filled hourly series from yearly archives
    Reconstruct {
        #[arg(short, long, required = true, help = "Station archive directory name (repeatable)")]
        station: Vec<String>,

        #[arg(long, help = "Window start, e.g. 2014-01-01 or '2014-01-01 06:00'")]
        start: String,

        #[arg(long, help = "Window end (inclusive)")]
        end: String,

        #[arg(
            short,
            long,
            help = "Archive root [default: GWO_HOURLY_DIR setting]"
        )]
        archive_root: Option<PathBuf>,

        #[arg(short, long, default_value = ".", help = "Directory for series CSV files")]
        output_dir: PathBuf,

        #[arg(long, help = "Also write the masked, raw and interpolated native tables")]
        all_views: bool,

        #[arg(long, help = "Do not load the years adjacent to the window")]
        no_boundary_probe: bool,

        #[arg(long, help = "Also mask estimated (remark 5) values")]
        mask_estimated: bool,

        #[arg(long, help = "Decimal places in output [default: shortest]")]
        precision: Option<usize>,

        #[arg(long, help = "Print reconstruction statistics as JSON")]
        json: bool,

        #[arg(long, help = "Worker threads [default: MAX_WORKERS setting]")]
        max_workers: Option<usize>,
    },

    /// Compare a converted yearly archive with a reference archive
    Verify {
        #[arg(help = "Converted archive file")]
        converted: PathBuf,

        #[arg(help = "Reference archive file")]
        reference: PathBuf,

        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },

    /// Audit yearly archives for remark/value consistency
    Check {
        #[arg(required = true, help = "Archive files")]
        files: Vec<PathBuf>,

        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },

    /// Show the resolved directory settings
    Config,
}
