pub mod archive_verifier;
pub mod cloud_interpolator;
pub mod converter;
pub mod integrity_checker;
pub mod interpolation;
pub mod parallel_processor;
pub mod quality_normalizer;
pub mod reconstructor;
pub mod row_encoder;
pub mod scaler;
pub mod stats;

pub use archive_verifier::{ArchiveVerifier, VerificationReport};
pub use cloud_interpolator::CloudInterpolator;
pub use converter::{ConversionOutput, GwoConverter};
pub use integrity_checker::{IntegrityChecker, IntegrityReport, RemarkViolation, ViolationType};
pub use parallel_processor::{ConversionJob, ParallelProcessor};
pub use reconstructor::{Reconstruction, TimeSeriesReconstructor};
pub use row_encoder::{EncodedRow, FieldWarning, RowEncoder};
pub use stats::{ConversionStats, ReconstructionStats};
