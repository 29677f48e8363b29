use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, Result};

/// Canonical remark code (RMK) attached to every measured quantity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Remark {
    NotProduced = 0,
    Missing = 1,
    NotObserved = 2,
    ExtremeBelowTrue = 3,
    ExtremeAboveTrue = 4,
    Estimated = 5,
    NoPhenomenon = 6,
    PreviousDayExtreme = 7,
    Normal = 8,
    NextDayExtreme = 9,
}

impl Remark {
    pub const ALL: [Remark; 10] = [
        Remark::NotProduced,
        Remark::Missing,
        Remark::NotObserved,
        Remark::ExtremeBelowTrue,
        Remark::ExtremeAboveTrue,
        Remark::Estimated,
        Remark::NoPhenomenon,
        Remark::PreviousDayExtreme,
        Remark::Normal,
        Remark::NextDayExtreme,
    ];

    pub fn from_u8(value: u8) -> Result<Self> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(ProcessingError::InvalidRemark(value))
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn description(&self) -> &'static str {
        match self {
            Remark::NotProduced => "value not yet produced",
            Remark::Missing => "missing (instrument failure)",
            Remark::NotObserved => "not observed",
            Remark::ExtremeBelowTrue => "daily extreme at or below true value",
            Remark::ExtremeAboveTrue => "daily extreme at or above true value",
            Remark::Estimated => "contains estimated or insufficient data",
            Remark::NoPhenomenon => "no phenomenon occurred",
            Remark::PreviousDayExtreme => "extreme occurred on the previous day",
            Remark::Normal => "normal observation",
            Remark::NextDayExtreme => "extreme occurred on the next day",
        }
    }

    /// Remarks 1 and 2: the quantity carries no measured value.
    pub fn is_absent(&self) -> bool {
        matches!(self, Remark::Missing | Remark::NotObserved)
    }

    pub fn is_usable(&self) -> bool {
        !matches!(
            self,
            Remark::NotProduced | Remark::Missing | Remark::NotObserved
        )
    }
}

impl std::fmt::Display for Remark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}
