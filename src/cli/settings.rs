//! Dispatch policy arguments.

use clap::Parser;

use crate::{
    core::settings::Settings,
    quantity::{price::KilowattHourPrice, proportions::Percent},
};

#[must_use]
#[derive(Copy, Clone, Parser)]
pub struct SettingsArgs {
    /// Always charge from any source while the price is below this.
    #[clap(long = "always-charge-under", env = "ALWAYS_CHARGE_UNDER", default_value = "0.0")]
    pub always_charge_under: KilowattHourPrice,

    /// Minimal gain per kilowatt-hour to charge now for later use.
    #[clap(long = "min-arbitrage-delta", env = "MIN_ARBITRAGE_DELTA", default_value = "0.05")]
    pub min_arbitrage_delta: KilowattHourPrice,

    /// Minimal saving per kilowatt-hour to charge ahead of a predicted deficit.
    #[clap(long = "min-deficit-delta", env = "MIN_DEFICIT_DELTA", default_value = "0.01")]
    pub min_deficit_delta: KilowattHourPrice,

    /// Battery reserve percent.
    #[clap(long = "min-battery-soc", env = "MIN_BATTERY_SOC", default_value = "20")]
    pub min_battery_soc: Percent,

    /// Zero disables the outlier rejection.
    #[clap(long = "outlier-multiplier", env = "OUTLIER_MULTIPLIER", default_value = "3.0")]
    pub outlier_multiplier: f64,

    #[clap(
        long = "grid-charge-allowed",
        env = "GRID_CHARGE_ALLOWED",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub grid_charge_allowed: bool,

    #[clap(
        long = "grid-export-allowed",
        env = "GRID_EXPORT_ALLOWED",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub grid_export_allowed: bool,

    /// Fees per imported kilowatt-hour on top of the published price.
    #[clap(long = "additional-fees", env = "ADDITIONAL_FEES", default_value = "0.0")]
    pub additional_fees: KilowattHourPrice,
}

impl From<SettingsArgs> for Settings {
    fn from(args: SettingsArgs) -> Self {
        Self::builder()
            .always_charge_under(args.always_charge_under)
            .min_arbitrage_delta(args.min_arbitrage_delta)
            .min_deficit_delta(args.min_deficit_delta)
            .min_battery_soc(args.min_battery_soc)
            .outlier_multiplier(args.outlier_multiplier)
            .grid_charge_allowed(args.grid_charge_allowed)
            .grid_export_allowed(args.grid_export_allowed)
            .additional_fees(args.additional_fees)
            .build()
    }
}
