use std::iter::once;

use bon::Builder;
use chrono::{DateTime, Local, TimeDelta, Timelike};
use itertools::Itertools;

use crate::{
    core::{
        interval::{Interval, start_of_hour},
        model::HourlyModel,
        price::Price,
        settings::Settings,
        status::SystemStatus,
        trend::SolarTrend,
    },
    prelude::*,
    quantity::{energy::KilowattHours, price::KilowattHourPrice, time::Hours},
};

/// Forward simulation of the battery energy over the next 24 hours.
///
/// The walk is greedy: it stops at the first hour that makes charging right now worthwhile.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Simulator<'a> {
    status: &'a SystemStatus,
    settings: &'a Settings,
    model: &'a HourlyModel,
    current_price: &'a Price,

    #[builder(default)]
    future_prices: &'a [Price],

    #[builder(default = SolarTrend::NEUTRAL)]
    solar_trend: SolarTrend,

    now: DateTime<Local>,
}

impl<S: simulator_builder::IsComplete> SimulatorBuilder<'_, S> {
    pub fn run(self) -> Simulation {
        self.build().run()
    }
}

impl Simulator<'_> {
    pub const N_SLOTS: i64 = 24;

    /// Shortest charging the battery must be able to absorb for an arbitrage to make sense.
    const ARBITRAGE_TEST_WINDOW: Hours = Hours(10.0 / 60.0);

    #[instrument(skip_all, fields(solar_trend = %self.solar_trend))]
    fn run(self) -> Simulation {
        let capacity = self.status.battery_capacity;
        let min_residual_energy = capacity * self.settings.min_battery_soc;
        let current_cost = self.current_price.grid_charge_price(self.settings.additional_fees);
        let charge_rate = self.status.max_charge_rate;
        let discharge_rate = self.status.max_discharge_rate;

        let slots = self.slots().collect_vec();
        let max_price = slots.iter().map(|slot| slot.charge_price).chain(once(current_cost)).max();

        let mut residual_energy = self.status.residual_energy();
        let mut simulation = Simulation {
            signal: None,
            deficit_at: None,
            capacity_hit_at: None,
            max_price: max_price.unwrap_or(current_cost),
            current_cost,
            min_residual_energy: residual_energy,
            max_residual_energy: residual_energy,
            trace: Vec::with_capacity(slots.len()),
        };

        for (index, slot) in slots.iter().enumerate() {
            let profile = self.model.on_hour(slot.interval.start.hour());
            let net_load = (profile.net_load(self.solar_trend.0) * slot.fraction)
                .min(discharge_rate * Hours(slot.fraction))
                .max(-(charge_rate * Hours(slot.fraction)));

            if net_load > KilowattHours::ZERO {
                residual_energy -= net_load;
            } else {
                residual_energy = (residual_energy - net_load).min(capacity);
                if residual_energy >= capacity && simulation.capacity_hit_at.is_none() {
                    trace!(at = ?slot.interval.start, "capacity hit");
                    simulation.capacity_hit_at = Some(slot.interval.start);
                }
            }
            simulation.min_residual_energy = simulation.min_residual_energy.min(residual_energy);
            simulation.max_residual_energy = simulation.max_residual_energy.max(residual_energy);
            simulation.trace.push(TraceRow {
                interval: slot.interval,
                charge_price: slot.charge_price,
                net_load,
                residual_energy,
                is_capacity_hit: simulation.capacity_hit_at.is_some(),
            });

            if residual_energy < min_residual_energy && simulation.deficit_at.is_none() {
                debug!(at = ?slot.interval.start, ?residual_energy, "deficit predicted");
                simulation.deficit_at = Some(slot.interval.start);
                if self.settings.grid_charge_allowed {
                    let signal = self.check_deficit_charge(
                        slot.interval.start,
                        min_residual_energy - residual_energy,
                        &slots[..=index],
                        current_cost,
                    );
                    if signal.is_some() {
                        simulation.signal = signal;
                        return simulation;
                    }
                }
            }

            if self.settings.grid_charge_allowed
                && self.settings.grid_export_allowed
                && simulation.capacity_hit_at.is_none()
                && residual_energy + charge_rate * Self::ARBITRAGE_TEST_WINDOW <= capacity
            {
                // Energy charged now either saves an import later or gets exported later:
                let value = if net_load > KilowattHours::ZERO {
                    slot.charge_price
                } else {
                    slot.export_price
                };
                if value - current_cost > self.settings.min_arbitrage_delta {
                    debug!(at = ?slot.interval.start, ?value, ?current_cost, "arbitrage");
                    simulation.signal =
                        Some(ChargeSignal::Arbitrage { at: slot.interval.start, value });
                    return simulation;
                }
            }
        }

        simulation
    }

    /// Decide whether charging right now is among the cheapest options to cover the deficit.
    fn check_deficit_charge(
        &self,
        deficit_at: DateTime<Local>,
        deficit: KilowattHours,
        slots_so_far: &[Slot],
        current_cost: KilowattHourPrice,
    ) -> Option<ChargeSignal> {
        let n_hours = Self::charging_hours(deficit / self.status.max_charge_rate);
        let costs = slots_so_far.iter().map(|slot| slot.charge_price).sorted().collect_vec();
        let threshold = costs.get(n_hours.saturating_sub(1)).or_else(|| costs.last()).copied()?;
        debug!(?deficit, n_hours, ?threshold, ?current_cost, "checking the deficit charge");
        (current_cost + self.settings.min_deficit_delta <= threshold).then_some(
            ChargeSignal::Deficit { at: deficit_at, deficit, n_hours, threshold },
        )
    }

    /// Whole hours needed to charge, ignoring floating-point noise in the fractional part.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn charging_hours(hours: Hours) -> usize {
        if !hours.0.is_finite() {
            return usize::MAX;
        }
        ((hours.0 * 100.0).round() / 100.0).ceil().max(1.0) as usize
    }

    /// Current partial hour followed by 23 whole hours.
    fn slots(&self) -> impl Iterator<Item = Slot> {
        let first_hour = start_of_hour(self.now);
        let elapsed = f64::from(self.now.minute()) / 60.0;
        (0..Self::N_SLOTS).map(move |index| {
            let interval = Interval::hour_from(first_hour + TimeDelta::hours(index));
            let price = self
                .future_prices
                .iter()
                .find(|price| price.hour_start() == interval.start)
                .unwrap_or(self.current_price);
            Slot {
                interval: if index == 0 { interval.with_start(self.now) } else { interval },
                fraction: if index == 0 { 1.0 - elapsed } else { 1.0 },
                charge_price: price.grid_charge_price(self.settings.additional_fees),
                export_price: price.export_price(),
            }
        })
    }
}

#[derive(Copy, Clone)]
struct Slot {
    interval: Interval,

    /// Part of the hour still ahead.
    fraction: f64,

    charge_price: KilowattHourPrice,
    export_price: KilowattHourPrice,
}

/// Reason to charge from the grid right now.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ChargeSignal {
    /// Now is among the cheapest hours to cover the predicted deficit.
    Deficit {
        at: DateTime<Local>,
        deficit: KilowattHours,
        n_hours: usize,

        /// The N-th cheapest charge price up to the deficit.
        threshold: KilowattHourPrice,
    },

    /// Energy charged now is worth more later.
    Arbitrage { at: DateTime<Local>, value: KilowattHourPrice },
}

#[must_use]
#[derive(Clone, Debug)]
pub struct Simulation {
    pub signal: Option<ChargeSignal>,

    /// First hour the battery drops below the reserve.
    pub deficit_at: Option<DateTime<Local>>,

    /// First hour the battery gets full.
    pub capacity_hit_at: Option<DateTime<Local>>,

    /// Maximum charge price over the horizon, including the current one.
    pub max_price: KilowattHourPrice,

    pub current_cost: KilowattHourPrice,
    pub min_residual_energy: KilowattHours,
    pub max_residual_energy: KilowattHours,
    pub trace: Vec<TraceRow>,
}

/// Simulated state after one slot.
#[derive(Copy, Clone, Debug)]
pub struct TraceRow {
    pub interval: Interval,
    pub charge_price: KilowattHourPrice,

    /// Positive is drawn from the battery, negative is stored.
    pub net_load: KilowattHours,

    pub residual_energy: KilowattHours,
    pub is_capacity_hit: bool,
}
