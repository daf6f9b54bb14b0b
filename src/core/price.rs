use bon::Builder;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{
    core::interval::{Interval, start_of_hour},
    quantity::price::KilowattHourPrice,
};

/// Energy price over a time interval, as published by the price provider.
#[must_use]
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
pub struct Price {
    #[serde(flatten)]
    pub interval: Interval,

    #[builder(into, default = "comed".to_owned())]
    pub provider: String,

    /// Market cost of the energy itself.
    #[serde(rename = "base_per_kwh")]
    pub base: KilowattHourPrice,

    /// Additional grid delivery cost, paid on import only.
    #[serde(rename = "delivery_per_kwh", default)]
    #[builder(default)]
    pub delivery: KilowattHourPrice,
}

impl Price {
    /// Total cost of importing one kilowatt-hour from the grid.
    pub fn grid_charge_price(&self, additional_fee: KilowattHourPrice) -> KilowattHourPrice {
        self.base + self.delivery + additional_fee
    }

    /// What one exported kilowatt-hour earns.
    pub const fn export_price(&self) -> KilowattHourPrice {
        self.base
    }

    pub fn is_negative(&self) -> bool {
        self.base < KilowattHourPrice::ZERO
    }

    #[must_use]
    pub fn hour_start(&self) -> DateTime<Local> {
        start_of_hour(self.interval.start)
    }
}
