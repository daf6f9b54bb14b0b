use bon::Builder;
use chrono::{DateTime, Local};

use crate::{
    core::{
        decision::{Decision, Intent, Rule},
        finalizer::{finalize_battery, finalize_solar},
        history::EnergyStats,
        mode::{BatteryMode, SolarMode},
        model::HourlyModel,
        price::Price,
        settings::Settings,
        simulator::{ChargeSignal, Simulation, Simulator},
        status::SystemStatus,
        trend::SolarTrend,
    },
    prelude::*,
    quantity::energy::KilowattHours,
};

/// Rule-priority dispatch engine.
///
/// Pure function of its inputs: nothing is kept between the calls.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Engine<'a> {
    status: &'a SystemStatus,
    current_price: &'a Price,

    #[builder(default)]
    future_prices: &'a [Price],

    #[builder(default)]
    history: &'a [EnergyStats],

    settings: &'a Settings,
    now: DateTime<Local>,
}

impl<S: engine_builder::IsComplete> EngineBuilder<'_, S> {
    pub fn decide(self) -> Decision {
        self.evaluate().decision
    }

    /// Decide and keep the intermediate results.
    pub fn evaluate(self) -> Evaluation {
        self.build().evaluate()
    }
}

#[must_use]
pub struct Evaluation {
    pub decision: Decision,
    pub model: HourlyModel,
    pub solar_trend: SolarTrend,

    /// Absent when a rule fired before the simulation.
    pub simulation: Option<Simulation>,
}

struct Verdict {
    battery_mode: BatteryMode,
    rule: Rule,
    detail: String,
    simulation: Option<Simulation>,
}

impl Verdict {
    const fn new(battery_mode: BatteryMode, rule: Rule, detail: String) -> Self {
        Self { battery_mode, rule, detail, simulation: None }
    }
}

impl Engine<'_> {
    #[instrument(skip_all, fields(price = ?self.current_price.base, now = %self.now))]
    fn evaluate(self) -> Evaluation {
        let model = HourlyModel::build(self.history, self.settings.outlier_multiplier);
        let solar_trend = SolarTrend::estimate(self.history, &model, self.now);

        let solar_mode = self.solar_intent();
        let verdict = self.apply_rules(&model, solar_trend);
        let intent = Intent { battery_mode: verdict.battery_mode, solar_mode };

        let decision = Decision {
            battery_mode: finalize_battery(intent.battery_mode, self.status, self.settings),
            solar_mode: finalize_solar(intent.solar_mode, self.status),
            intent,
            rule: verdict.rule,
            description: format!("{}: {}", verdict.rule, verdict.detail),
            deficit_at: verdict.simulation.as_ref().and_then(|simulation| simulation.deficit_at),
            capacity_hit_at: verdict
                .simulation
                .as_ref()
                .and_then(|simulation| simulation.capacity_hit_at),
        };
        info!(
            rule = ?decision.rule,
            battery_mode = %decision.battery_mode,
            solar_mode = %decision.solar_mode,
            wanted_battery_mode = %intent.battery_mode,
            wanted_solar_mode = %intent.solar_mode,
            "decided",
        );
        Evaluation { decision, model, solar_trend, simulation: verdict.simulation }
    }

    /// Never pay to push the power onto the grid.
    fn solar_intent(&self) -> SolarMode {
        if !self.settings.grid_export_allowed {
            SolarMode::NoExport
        } else if self.current_price.is_negative() {
            info!(price = ?self.current_price.base, "negative price, disabling the export");
            SolarMode::NoExport
        } else {
            SolarMode::AnyExport
        }
    }

    fn apply_rules(&self, model: &HourlyModel, solar_trend: SolarTrend) -> Verdict {
        let price = self.current_price.base;
        if price < self.settings.always_charge_under {
            return Verdict::new(
                BatteryMode::ChargeFromAny,
                Rule::PriceLow,
                format!("{price} is below {}", self.settings.always_charge_under),
            );
        }

        if self.status.battery_capacity <= KilowattHours::ZERO {
            return Verdict::new(
                BatteryMode::Standby,
                Rule::ZeroCapacity,
                "nothing to dispatch".to_owned(),
            );
        }

        let simulation = Simulator::builder()
            .status(self.status)
            .settings(self.settings)
            .model(model)
            .solar_trend(solar_trend)
            .current_price(self.current_price)
            .future_prices(self.future_prices)
            .now(self.now)
            .run();
        let current_cost = simulation.current_cost;

        let (battery_mode, rule, detail) = match (simulation.signal, simulation.deficit_at) {
            (Some(ChargeSignal::Deficit { at, deficit, n_hours, threshold }), _) => (
                BatteryMode::ChargeFromAny,
                Rule::DeficitCharge,
                format!(
                    "short of {deficit} at {}, {current_cost} is within the {n_hours} cheapest hour(s) up to {threshold}, about {} to cover",
                    at.format("%H:%M"),
                    deficit * current_cost,
                ),
            ),
            (Some(ChargeSignal::Arbitrage { at, value }), _) => (
                BatteryMode::ChargeFromAny,
                Rule::ArbitrageCharge,
                format!("{current_cost} now, worth {value} at {}", at.format("%H:%M")),
            ),
            (None, Some(deficit_at)) if current_cost < simulation.max_price => (
                BatteryMode::Standby,
                Rule::SaveForPeak,
                format!(
                    "short at {}, {current_cost} is below the peak of {}",
                    deficit_at.format("%H:%M"),
                    simulation.max_price,
                ),
            ),
            (None, Some(deficit_at)) => (
                BatteryMode::Load,
                Rule::UseAtPeak,
                format!(
                    "short at {}, but {current_cost} is already the peak",
                    deficit_at.format("%H:%M"),
                ),
            ),
            (None, None) => (
                BatteryMode::Load,
                Rule::NoDeficit,
                format!("the reserve holds, lowest at {}", simulation.min_residual_energy),
            ),
        };
        Verdict { battery_mode, rule, detail, simulation: Some(simulation) }
    }
}
