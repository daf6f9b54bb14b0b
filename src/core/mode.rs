use std::fmt::{Display, Formatter};

use comfy_table::Color;
use serde::{Deserialize, Serialize};

/// Battery operating mode to command.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatteryMode {
    /// Forced charging from any source, including the grid.
    ChargeFromAny,

    /// Charge on excess solar power only.
    ChargeFromSolar,

    /// Neither charge from the grid nor discharge.
    Standby,

    /// Discharge to cover the home load.
    Load,

    /// Keep whatever the battery is doing.
    NoChange,
}

impl BatteryMode {
    pub const fn color(self) -> Color {
        match self {
            Self::ChargeFromAny => Color::Green,
            Self::ChargeFromSolar => Color::Cyan,
            Self::Standby => Color::DarkYellow,
            Self::Load => Color::Blue,
            Self::NoChange => Color::Reset,
        }
    }
}

impl Display for BatteryMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChargeFromAny => write!(f, "Charge"),
            Self::ChargeFromSolar => write!(f, "Harvest"),
            Self::Standby => write!(f, "Standby"),
            Self::Load => write!(f, "Load"),
            Self::NoChange => write!(f, "No change"),
        }
    }
}

/// Solar export policy to command.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolarMode {
    AnyExport,
    NoExport,
    NoChange,
}

impl SolarMode {
    pub const fn color(self) -> Color {
        match self {
            Self::AnyExport => Color::Green,
            Self::NoExport => Color::Red,
            Self::NoChange => Color::Reset,
        }
    }
}

impl Display for SolarMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AnyExport => write!(f, "Export"),
            Self::NoExport => write!(f, "No export"),
            Self::NoChange => write!(f, "No change"),
        }
    }
}
