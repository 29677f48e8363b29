pub mod field;
pub mod observation;
pub mod remark;
pub mod series;
pub mod signal;
pub mod station;

pub use field::{Field, MaskPolicy, FIELD_COUNT};
pub use observation::{Measurement, ObservationRecord};
pub use remark::Remark;
pub use series::{SeriesRow, SeriesTable, Units};
pub use signal::{RawObservation, RawSignal};
pub use station::{StationCatalog, StationMetadata, StationRemark};
