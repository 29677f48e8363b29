use serde::{Deserialize, Serialize};

use crate::models::remark::Remark;
use crate::processors::scaler::direction_bearing;

/// Measured quantities carried by a canonical GWO record, in archive order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    LocalPressure,
    SeaPressure,
    Temperature,
    VaporPressure,
    Humidity,
    WindDirection,
    WindSpeed,
    CloudCover,
    Weather,
    DewPoint,
    Sunshine,
    Solar,
    Precipitation,
}

pub const FIELD_COUNT: usize = 13;

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::LocalPressure,
        Field::SeaPressure,
        Field::Temperature,
        Field::VaporPressure,
        Field::Humidity,
        Field::WindDirection,
        Field::WindSpeed,
        Field::CloudCover,
        Field::Weather,
        Field::DewPoint,
        Field::Sunshine,
        Field::Solar,
        Field::Precipitation,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Short column key used in series output and reports.
    pub fn key(&self) -> &'static str {
        match self {
            Field::LocalPressure => "local_pressure",
            Field::SeaPressure => "sea_pressure",
            Field::Temperature => "temperature",
            Field::VaporPressure => "vapor_pressure",
            Field::Humidity => "humidity",
            Field::WindDirection => "wind_direction",
            Field::WindSpeed => "wind_speed",
            Field::CloudCover => "cloud_cover",
            Field::Weather => "weather",
            Field::DewPoint => "dew_point",
            Field::Sunshine => "sunshine",
            Field::Solar => "solar",
            Field::Precipitation => "precipitation",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Field::LocalPressure => "Local Pressure",
            Field::SeaPressure => "Sea-Level Pressure",
            Field::Temperature => "Temperature",
            Field::VaporPressure => "Vapor Pressure",
            Field::Humidity => "Relative Humidity",
            Field::WindDirection => "Wind Direction",
            Field::WindSpeed => "Wind Speed",
            Field::CloudCover => "Cloud Cover",
            Field::Weather => "Present Weather",
            Field::DewPoint => "Dew Point",
            Field::Sunshine => "Sunshine Duration",
            Field::Solar => "Solar Radiation",
            Field::Precipitation => "Precipitation",
        }
    }

    /// Fixed-point factor between physical source values and archive integers.
    pub fn scale(&self) -> f64 {
        match self {
            Field::Solar => 100.0,
            Field::Humidity | Field::WindDirection | Field::CloudCover | Field::Weather => 1.0,
            _ => 10.0,
        }
    }

    /// Units of the archive integers.
    pub fn canonical_units(&self) -> &'static str {
        match self {
            Field::LocalPressure | Field::SeaPressure | Field::VaporPressure => "0.1 hPa",
            Field::Temperature | Field::DewPoint => "0.1 °C",
            Field::Humidity => "%",
            Field::WindDirection => "16-point code",
            Field::WindSpeed => "0.1 m/s",
            Field::CloudCover => "tenths",
            Field::Weather => "code",
            Field::Sunshine => "0.1 h",
            Field::Solar => "0.01 MJ/m²",
            Field::Precipitation => "0.1 mm",
        }
    }

    /// Units after physical conversion.
    pub fn physical_units(&self) -> &'static str {
        match self {
            Field::LocalPressure | Field::SeaPressure | Field::VaporPressure => "hPa",
            Field::Temperature | Field::DewPoint => "°C",
            Field::Humidity | Field::CloudCover => "fraction",
            Field::WindDirection => "degrees",
            Field::WindSpeed => "m/s",
            Field::Weather => "code",
            Field::Sunshine => "h",
            Field::Solar => "W/m²",
            Field::Precipitation => "mm/h",
        }
    }

    /// Converts an archive value to physical units.
    pub fn to_physical(&self, canonical: f64) -> f64 {
        match self {
            Field::Humidity => canonical / 100.0,
            Field::CloudCover => canonical / 10.0,
            Field::WindDirection => direction_bearing(canonical),
            Field::Weather => canonical,
            // 0.01 MJ/m² accumulated over one hour
            Field::Solar => canonical * 1.0e4 / 3.6e3,
            _ => canonical / self.scale(),
        }
    }

    /// Fields where a "not observed" or "no phenomenon" remark is written as an explicit zero.
    pub fn accepts_explicit_zero(&self, remark: Remark) -> bool {
        match self {
            Field::Sunshine | Field::Solar => {
                matches!(remark, Remark::NotObserved | Remark::NoPhenomenon)
            }
            Field::Precipitation => remark == Remark::NoPhenomenon,
            _ => false,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Per-field set of remark codes whose values are treated as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskPolicy {
    sets: Vec<Vec<Remark>>,
}

impl MaskPolicy {
    pub fn new() -> Self {
        let sets = Field::ALL
            .iter()
            .map(|field| match field {
                Field::Sunshine | Field::Solar => vec![Remark::NotProduced, Remark::Missing],
                _ => vec![Remark::NotProduced, Remark::Missing, Remark::NotObserved],
            })
            .collect();
        Self { sets }
    }

    /// Policy that masks nothing.
    pub fn none() -> Self {
        Self {
            sets: vec![Vec::new(); FIELD_COUNT],
        }
    }

    pub fn with_field(mut self, field: Field, remarks: &[Remark]) -> Self {
        self.sets[field.index()] = remarks.to_vec();
        self
    }

    pub fn masks(&self, field: Field, remark: Remark) -> bool {
        self.sets[field.index()].contains(&remark)
    }

    pub fn remarks_for(&self, field: Field) -> &[Remark] {
        &self.sets[field.index()]
    }
}

impl Default for MaskPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_order_matches_index() {
        for (i, field) in Field::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn test_scale_factors() {
        assert_eq!(Field::SeaPressure.scale(), 10.0);
        assert_eq!(Field::Solar.scale(), 100.0);
        assert_eq!(Field::Humidity.scale(), 1.0);
        assert_eq!(Field::CloudCover.scale(), 1.0);
        assert_eq!(Field::Precipitation.scale(), 10.0);
    }

    #[test]
    fn test_physical_conversion() {
        assert!((Field::SeaPressure.to_physical(10084.0) - 1008.4).abs() < 1e-9);
        assert!((Field::Humidity.to_physical(65.0) - 0.65).abs() < 1e-9);
        assert!((Field::Solar.to_physical(36.0) - 100.0).abs() < 1e-9);
        assert!((Field::WindDirection.to_physical(16.0) - 270.0).abs() < 1e-9);
        assert!((Field::WindDirection.to_physical(4.0) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_mask_policy() {
        let policy = MaskPolicy::default();
        assert!(policy.masks(Field::Temperature, Remark::NotObserved));
        assert!(policy.masks(Field::Temperature, Remark::Missing));
        assert!(!policy.masks(Field::Temperature, Remark::Estimated));
        assert!(!policy.masks(Field::Sunshine, Remark::NotObserved));
        assert!(policy.masks(Field::Solar, Remark::Missing));

        let custom = MaskPolicy::none().with_field(Field::Humidity, &[Remark::Estimated]);
        assert!(custom.masks(Field::Humidity, Remark::Estimated));
        assert!(!custom.masks(Field::Temperature, Remark::Missing));
    }

    #[test]
    fn test_explicit_zero_fields() {
        assert!(Field::Sunshine.accepts_explicit_zero(Remark::NotObserved));
        assert!(Field::Solar.accepts_explicit_zero(Remark::NoPhenomenon));
        assert!(Field::Precipitation.accepts_explicit_zero(Remark::NoPhenomenon));
        assert!(!Field::Precipitation.accepts_explicit_zero(Remark::NotObserved));
        assert!(!Field::Temperature.accepts_explicit_zero(Remark::NotObserved));
    }
}
