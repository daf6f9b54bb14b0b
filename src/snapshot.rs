use std::{fs, path::Path};

use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::{
    core::{history::EnergyStats, price::Price, settings::Settings, status::SystemStatus},
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts, proportions::Percent},
};

/// Everything the engine needs for one decision, as gathered by the surrounding service.
#[must_use]
#[derive(Deserialize)]
pub struct Snapshot {
    pub status: SystemStatus,
    pub current_price: Price,

    #[serde(default)]
    pub future_prices: Vec<Price>,

    #[serde(default)]
    pub history: Vec<EnergyStats>,

    /// Overrides the command-line settings.
    #[serde(default)]
    pub settings: Option<Settings>,

    /// Decision time, defaults to the current time.
    #[serde(default)]
    pub now: Option<DateTime<Local>>,
}

impl Snapshot {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let this = Self::from_json(&contents)?;
        info!(
            n_future_prices = this.future_prices.len(),
            n_history = this.history.len(),
            "loaded the snapshot",
        );
        Ok(this)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let this: Self = serde_json::from_str(contents).context("malformed snapshot")?;
        this.validate()?;
        Ok(this)
    }

    pub fn now(&self) -> DateTime<Local> {
        self.now.unwrap_or_else(Local::now)
    }

    fn validate(&self) -> Result {
        let status = &self.status;
        ensure!(
            (Percent::ZERO..=Percent::FULL).contains(&status.state_of_charge),
            "state of charge is out of range: {}",
            status.state_of_charge,
        );
        ensure!(
            status.battery_capacity >= KilowattHours::ZERO,
            "negative battery capacity: {}",
            status.battery_capacity,
        );
        ensure!(
            status.max_charge_rate >= Kilowatts::ZERO && status.max_discharge_rate >= Kilowatts::ZERO,
            "negative charge or discharge rate",
        );
        for price in std::iter::once(&self.current_price).chain(&self.future_prices) {
            if price.interval.end <= price.interval.start {
                bail!("empty price interval: {:?}", price.interval);
            }
        }
        if let Some(settings) = &self.settings {
            ensure!(
                (Percent::ZERO..=Percent::FULL).contains(&settings.min_battery_soc),
                "minimum state of charge is out of range: {}",
                settings.min_battery_soc,
            );
        }
        Ok(())
    }
}
