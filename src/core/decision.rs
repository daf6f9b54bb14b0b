use std::fmt::{Display, Formatter};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::core::mode::{BatteryMode, SolarMode};

/// Rule which made the decision.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    PriceLow,
    ZeroCapacity,
    DeficitCharge,
    ArbitrageCharge,
    SaveForPeak,
    UseAtPeak,
    NoDeficit,
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PriceLow => write!(f, "Price Low"),
            Self::ZeroCapacity => write!(f, "Zero Battery Capacity"),
            Self::DeficitCharge => write!(f, "Charge Now to Avoid Deficit"),
            Self::ArbitrageCharge => write!(f, "Arbitrage Charge Now"),
            Self::SaveForPeak => write!(f, "Save for Peak"),
            Self::UseAtPeak => write!(f, "Use at Peak"),
            Self::NoDeficit => write!(f, "No Deficit"),
        }
    }
}

/// Modes the rules asked for, before collapsing them against the telemetry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Intent {
    pub battery_mode: BatteryMode,
    pub solar_mode: SolarMode,
}

#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct Decision {
    pub battery_mode: BatteryMode,
    pub solar_mode: SolarMode,
    pub intent: Intent,
    pub rule: Rule,

    /// Human-readable explanation, starting with the rule name.
    pub description: String,

    pub deficit_at: Option<DateTime<Local>>,
    pub capacity_hit_at: Option<DateTime<Local>>,
}
