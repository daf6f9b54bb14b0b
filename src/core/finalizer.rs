//! Collapse the wanted modes into [`BatteryMode::NoChange`] and [`SolarMode::NoChange`]
//! when the telemetry shows that the system already does what is wanted.
//!
//! The device state is never stored, it is inferred from the telemetry on every call.

use crate::{
    core::{
        mode::{BatteryMode, SolarMode},
        settings::Settings,
        status::SystemStatus,
    },
    quantity::{power::Kilowatts, proportions::Percent},
};

/// Telemetry noise below which the battery counts as idle.
const POWER_TOLERANCE: Kilowatts = Kilowatts(0.1);

/// State of charge at which the battery counts as full.
const FULL_STATE_OF_CHARGE: Percent = Percent(99.0);

#[must_use]
pub fn finalize_battery(
    target: BatteryMode,
    status: &SystemStatus,
    settings: &Settings,
) -> BatteryMode {
    let is_import_restricted = !settings.grid_charge_allowed || !status.can_import_battery;
    let is_unchanged = match target {
        BatteryMode::ChargeFromAny | BatteryMode::ChargeFromSolar => {
            // Already latched into the forced charging:
            let is_charging =
                status.is_charging() || status.state_of_charge >= FULL_STATE_OF_CHARGE;
            is_charging && status.elevated_min_soc && is_import_restricted
        }
        BatteryMode::Standby => {
            let is_grid_charging =
                status.charging_power() > status.solar_surplus() + POWER_TOLERANCE;
            let is_idle = status.battery_power.abs() <= POWER_TOLERANCE;
            let is_solar_charging = status.is_charging() && !is_grid_charging;
            let is_held_discharging =
                status.is_discharging() && status.above_min_soc && status.elevated_min_soc;
            is_idle || is_solar_charging || is_held_discharging
        }
        BatteryMode::Load => !status.elevated_min_soc && is_import_restricted,
        BatteryMode::NoChange => true,
    };
    if is_unchanged { BatteryMode::NoChange } else { target }
}

#[must_use]
pub fn finalize_solar(target: SolarMode, status: &SystemStatus) -> SolarMode {
    match target {
        SolarMode::AnyExport if status.can_export_solar => SolarMode::NoChange,
        SolarMode::NoExport if !status.can_export_solar => SolarMode::NoChange,
        _ => target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::{energy::KilowattHours, price::KilowattHourPrice};

    fn settings(grid_charge_allowed: bool) -> Settings {
        Settings::builder()
            .always_charge_under(KilowattHourPrice::ZERO)
            .min_arbitrage_delta(KilowattHourPrice(0.05))
            .min_deficit_delta(KilowattHourPrice(0.01))
            .min_battery_soc(Percent(20.0))
            .outlier_multiplier(3.0)
            .grid_charge_allowed(grid_charge_allowed)
            .grid_export_allowed(true)
            .build()
    }

    fn status(battery_power: f64, solar_power: f64, home_power: f64) -> SystemStatus {
        SystemStatus::builder()
            .state_of_charge(Percent(50.0))
            .battery_power(Kilowatts(battery_power))
            .solar_power(Kilowatts(solar_power))
            .home_power(Kilowatts(home_power))
            .battery_capacity(KilowattHours(13.6))
            .max_charge_rate(Kilowatts(5.0))
            .max_discharge_rate(Kilowatts(5.0))
            .build()
    }

    #[test]
    fn charge_is_latched() {
        let status = SystemStatus { elevated_min_soc: true, ..status(-3.0, 0.0, 0.5) };
        assert_eq!(
            finalize_battery(BatteryMode::ChargeFromAny, &status, &settings(false)),
            BatteryMode::NoChange,
        );
        assert_eq!(
            finalize_battery(BatteryMode::ChargeFromSolar, &status, &settings(false)),
            BatteryMode::NoChange,
        );
    }

    #[test]
    fn charge_when_full_and_latched() {
        let status = SystemStatus {
            elevated_min_soc: true,
            can_import_battery: false,
            state_of_charge: Percent(99.5),
            ..status(0.0, 0.0, 0.5)
        };
        assert_eq!(
            finalize_battery(BatteryMode::ChargeFromAny, &status, &settings(true)),
            BatteryMode::NoChange,
        );
    }

    #[test]
    fn charge_is_not_latched_yet() {
        // Charging, but no elevated reserve:
        let status = status(-3.0, 0.0, 0.5);
        assert_eq!(
            finalize_battery(BatteryMode::ChargeFromAny, &status, &settings(false)),
            BatteryMode::ChargeFromAny,
        );

        // Latched, but the grid import is still open:
        let status = SystemStatus { elevated_min_soc: true, ..status };
        assert_eq!(
            finalize_battery(BatteryMode::ChargeFromAny, &status, &settings(true)),
            BatteryMode::ChargeFromAny,
        );

        // Latched, but not charging:
        let status = SystemStatus { battery_power: Kilowatts(1.0), ..status };
        assert_eq!(
            finalize_battery(BatteryMode::ChargeFromAny, &status, &settings(false)),
            BatteryMode::ChargeFromAny,
        );
    }

    #[test]
    fn standby_when_idle() {
        assert_eq!(
            finalize_battery(BatteryMode::Standby, &status(0.05, 0.0, 0.5), &settings(true)),
            BatteryMode::NoChange,
        );
    }

    #[test]
    fn standby_when_charging_from_solar() {
        // 2 kW into the battery out of 2.5 kW of surplus:
        assert_eq!(
            finalize_battery(BatteryMode::Standby, &status(-2.0, 3.0, 0.5), &settings(true)),
            BatteryMode::NoChange,
        );
    }

    #[test]
    fn standby_stops_grid_charging() {
        // 3 kW into the battery with 0.5 kW of surplus:
        assert_eq!(
            finalize_battery(BatteryMode::Standby, &status(-3.0, 1.0, 0.5), &settings(true)),
            BatteryMode::Standby,
        );
    }

    #[test]
    fn standby_tolerates_small_grid_share() {
        assert_eq!(
            finalize_battery(BatteryMode::Standby, &status(-2.55, 3.0, 0.5), &settings(true)),
            BatteryMode::NoChange,
        );
    }

    #[test]
    fn standby_stops_discharging() {
        let status = status(2.0, 0.0, 2.0);
        assert_eq!(
            finalize_battery(BatteryMode::Standby, &status, &settings(true)),
            BatteryMode::Standby,
        );

        // Unless the elevated reserve already holds the battery:
        let status = SystemStatus { elevated_min_soc: true, ..status };
        assert_eq!(
            finalize_battery(BatteryMode::Standby, &status, &settings(true)),
            BatteryMode::NoChange,
        );

        // But not when the battery is already at the reserve:
        let status = SystemStatus { above_min_soc: false, ..status };
        assert_eq!(
            finalize_battery(BatteryMode::Standby, &status, &settings(true)),
            BatteryMode::Standby,
        );
    }

    #[test]
    fn load_when_unrestricted() {
        assert_eq!(
            finalize_battery(BatteryMode::Load, &status(1.0, 0.0, 1.0), &settings(false)),
            BatteryMode::NoChange,
        );
        let status = SystemStatus { can_import_battery: false, ..status(1.0, 0.0, 1.0) };
        assert_eq!(
            finalize_battery(BatteryMode::Load, &status, &settings(true)),
            BatteryMode::NoChange,
        );
    }

    #[test]
    fn load_lifts_restrictions() {
        assert_eq!(
            finalize_battery(BatteryMode::Load, &status(0.0, 0.0, 1.0), &settings(true)),
            BatteryMode::Load,
        );
        let status = SystemStatus { elevated_min_soc: true, ..status(0.0, 0.0, 1.0) };
        assert_eq!(
            finalize_battery(BatteryMode::Load, &status, &settings(false)),
            BatteryMode::Load,
        );
    }

    #[test]
    fn no_change_stays() {
        assert_eq!(
            finalize_battery(BatteryMode::NoChange, &status(-5.0, 0.0, 0.0), &settings(true)),
            BatteryMode::NoChange,
        );
    }

    #[test]
    fn solar_mode() {
        let exporting = SystemStatus { can_export_solar: true, ..status(0.0, 3.0, 0.5) };
        let restricted = status(0.0, 3.0, 0.5);
        assert_eq!(finalize_solar(SolarMode::AnyExport, &exporting), SolarMode::NoChange);
        assert_eq!(finalize_solar(SolarMode::NoExport, &exporting), SolarMode::NoExport);
        assert_eq!(finalize_solar(SolarMode::AnyExport, &restricted), SolarMode::AnyExport);
        assert_eq!(finalize_solar(SolarMode::NoExport, &restricted), SolarMode::NoChange);
        assert_eq!(finalize_solar(SolarMode::NoChange, &restricted), SolarMode::NoChange);
    }
}
