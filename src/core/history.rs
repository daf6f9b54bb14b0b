use bon::Builder;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::quantity::energy::KilowattHours;

/// Energy flows aggregated over one physical hour.
#[must_use]
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
pub struct EnergyStats {
    /// Start of the hour.
    pub hour: DateTime<Local>,

    /// Solar energy produced.
    pub solar: KilowattHours,

    /// Energy consumed by the home.
    pub home: KilowattHours,

    /// Where the home energy came from.
    #[serde(default)]
    #[builder(default)]
    pub home_sources: HomeSources,

    /// Where the solar energy went.
    #[serde(default)]
    #[builder(default)]
    pub solar_destinations: SolarDestinations,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct HomeSources {
    pub solar: KilowattHours,
    pub battery: KilowattHours,
    pub grid: KilowattHours,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct SolarDestinations {
    pub home: KilowattHours,
    pub battery: KilowattHours,
    pub grid: KilowattHours,
}
