use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::quantity::{energy::KilowattHours, power::Kilowatts, proportions::Percent};

/// Telemetry snapshot of the battery and solar system.
#[must_use]
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
pub struct SystemStatus {
    pub state_of_charge: Percent,

    /// Positive is discharging, negative is charging.
    pub battery_power: Kilowatts,

    #[builder(default)]
    pub solar_power: Kilowatts,

    #[builder(default)]
    pub home_power: Kilowatts,

    /// Positive is import.
    #[builder(default)]
    pub grid_power: Kilowatts,

    pub battery_capacity: KilowattHours,
    pub max_charge_rate: Kilowatts,
    pub max_discharge_rate: Kilowatts,

    #[builder(default)]
    pub can_export_solar: bool,

    #[builder(default)]
    pub can_export_battery: bool,

    #[builder(default = true)]
    pub can_import_battery: bool,

    /// Set while a higher reserve is forced to prevent imminent over-discharge.
    #[builder(default)]
    pub elevated_min_soc: bool,

    #[builder(default = true)]
    pub above_min_soc: bool,
}

impl SystemStatus {
    pub fn residual_energy(&self) -> KilowattHours {
        self.battery_capacity * self.state_of_charge
    }

    pub fn is_charging(&self) -> bool {
        self.battery_power < Kilowatts::ZERO
    }

    pub fn is_discharging(&self) -> bool {
        self.battery_power > Kilowatts::ZERO
    }

    pub fn charging_power(&self) -> Kilowatts {
        (-self.battery_power).max(Kilowatts::ZERO)
    }

    /// Solar power left over after the home load.
    pub fn solar_surplus(&self) -> Kilowatts {
        (self.solar_power - self.home_power).max(Kilowatts::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn residual_energy() {
        let status = SystemStatus::builder()
            .state_of_charge(Percent(50.0))
            .battery_power(Kilowatts(-1.5))
            .battery_capacity(KilowattHours(13.6))
            .max_charge_rate(Kilowatts(5.0))
            .max_discharge_rate(Kilowatts(5.0))
            .build();
        assert_abs_diff_eq!(status.residual_energy().0, 6.8);
        assert!(status.is_charging());
        assert_eq!(status.charging_power(), Kilowatts(1.5));
    }

    #[test]
    fn solar_surplus_never_negative() {
        let status = SystemStatus::builder()
            .state_of_charge(Percent(50.0))
            .battery_power(Kilowatts::ZERO)
            .solar_power(Kilowatts(0.5))
            .home_power(Kilowatts(2.0))
            .battery_capacity(KilowattHours(13.6))
            .max_charge_rate(Kilowatts(5.0))
            .max_discharge_rate(Kilowatts(5.0))
            .build();
        assert_eq!(status.solar_surplus(), Kilowatts::ZERO);
    }
}
