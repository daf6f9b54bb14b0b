use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::quantity::{price::KilowattHourPrice, proportions::Percent};

/// Tunable dispatch policy.
#[must_use]
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
pub struct Settings {
    /// Always charge from any source while the price is below this.
    pub always_charge_under: KilowattHourPrice,

    /// Minimal gain per kilowatt-hour to charge now for later use.
    pub min_arbitrage_delta: KilowattHourPrice,

    /// Minimal saving per kilowatt-hour to charge now ahead of a predicted deficit.
    pub min_deficit_delta: KilowattHourPrice,

    /// Reserve the battery must never drop below.
    pub min_battery_soc: Percent,

    /// An hourly sample is an outlier when its load exceeds the mean of the others this many times.
    ///
    /// Zero or negative disables the outlier rejection.
    pub outlier_multiplier: f64,

    pub grid_charge_allowed: bool,
    pub grid_export_allowed: bool,

    /// Extra fee per imported kilowatt-hour on top of the published price.
    #[serde(default)]
    #[builder(default)]
    pub additional_fees: KilowattHourPrice,
}
