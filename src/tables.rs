use average::Mean;
use chrono::{DateTime, Local};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{
        decision::Decision,
        history::EnergyStats,
        model::HourlyModel,
        simulator::TraceRow,
        trend::SolarTrend,
    },
    quantity::{energy::KilowattHours, price::KilowattHourPrice, time::Hours},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn format_optional_time(timestamp: Option<DateTime<Local>>) -> Cell {
    timestamp.map_or_else(
        || Cell::new("never").add_attribute(Attribute::Dim),
        |timestamp| Cell::new(timestamp.format("%b %d %H:%M")),
    )
}

pub fn build_decision_table(decision: &Decision) -> Table {
    let mut table = new_table();
    table.set_header(vec!["", "Wanted", "Command"]);
    table.add_row(vec![
        Cell::new("Battery").add_attribute(Attribute::Bold),
        Cell::new(decision.intent.battery_mode)
            .fg(decision.intent.battery_mode.color())
            .add_attribute(Attribute::Dim),
        Cell::new(decision.battery_mode).fg(decision.battery_mode.color()),
    ]);
    table.add_row(vec![
        Cell::new("Solar").add_attribute(Attribute::Bold),
        Cell::new(decision.intent.solar_mode)
            .fg(decision.intent.solar_mode.color())
            .add_attribute(Attribute::Dim),
        Cell::new(decision.solar_mode).fg(decision.solar_mode.color()),
    ]);
    table.add_row(vec![
        Cell::new("Deficit").add_attribute(Attribute::Bold),
        format_optional_time(decision.deficit_at),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Full").add_attribute(Attribute::Bold),
        format_optional_time(decision.capacity_hit_at),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Rule").add_attribute(Attribute::Bold),
        Cell::new(&decision.description),
        Cell::new(decision.rule),
    ]);
    table
}

pub fn build_model_table(model: &HourlyModel, solar_trend: SolarTrend) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Hour", "Solar", "Load", "Net", "Samples", "Outlier"]);
    for (hour, profile) in model.iter() {
        let net_load = profile.net_load(solar_trend.0);
        table.add_row(vec![
            Cell::new(format!("{hour:02}:00")),
            Cell::new(profile.solar).set_alignment(CellAlignment::Right),
            Cell::new(profile.load).set_alignment(CellAlignment::Right),
            Cell::new(net_load).set_alignment(CellAlignment::Right).fg(
                if net_load >= KilowattHours::ONE_WATT_HOUR {
                    Color::Red
                } else {
                    Color::Green
                },
            ),
            Cell::new(profile.n_samples)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            if profile.has_outlier {
                Cell::new("excluded").fg(Color::DarkYellow)
            } else {
                Cell::new("")
            },
        ]);
    }
    table
}

fn mean_charge_price(trace: &[TraceRow]) -> KilowattHourPrice {
    let estimate: Mean = trace.iter().map(|row| row.charge_price.0).collect();
    if estimate.is_empty() { KilowattHourPrice::ZERO } else { KilowattHourPrice(estimate.mean()) }
}

pub fn build_trace_table(
    trace: &[TraceRow],
    min_residual_energy: KilowattHours,
    deficit_at: Option<DateTime<Local>>,
) -> Table {
    let mean_price = mean_charge_price(trace);

    let mut table = new_table();
    table.set_header(vec!["Date", "Start", "End", "Hours", "Price", "Net", "Residual", "Full"]);
    for row in trace {
        let is_deficit_hour = deficit_at.is_some_and(|at| row.interval.contains(at));
        let mut start = Cell::new(row.interval.start.format("%H:%M"));
        if is_deficit_hour {
            start = start.fg(Color::Red).add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            Cell::new(row.interval.start.format("%b %d")).add_attribute(Attribute::Dim),
            start,
            Cell::new(row.interval.end.format("%H:%M")).add_attribute(Attribute::Dim),
            Cell::new(Hours::from(row.interval.duration()))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(row.charge_price).fg(
                if row.charge_price >= mean_price + KilowattHourPrice::ONE_CENT {
                    Color::Red
                } else if row.charge_price >= mean_price {
                    Color::DarkYellow
                } else {
                    Color::Green
                },
            ),
            Cell::new(row.net_load).set_alignment(CellAlignment::Right).fg(
                if row.net_load > KilowattHours::ZERO { Color::Red } else { Color::Green },
            ),
            Cell::new(row.residual_energy).set_alignment(CellAlignment::Right).fg(
                if row.residual_energy >= min_residual_energy { Color::Reset } else { Color::Red },
            ),
            if row.is_capacity_hit { Cell::new("yes").fg(Color::Green) } else { Cell::new("") },
        ]);
    }
    table
}

pub fn build_history_table(history: &[EnergyStats]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Date", "Hour", "Solar", "→Home", "→Battery", "→Grid", "Home", "Solar→", "Battery→",
        "Grid→",
    ]);
    for stats in history {
        let solar = stats.solar_destinations;
        let home = stats.home_sources;
        table.add_row(vec![
            Cell::new(stats.hour.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(stats.hour.format("%H:%M")),
            Cell::new(stats.solar).set_alignment(CellAlignment::Right).fg(Color::Green),
            Cell::new(solar.home).set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
            Cell::new(solar.battery)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(solar.grid).set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
            Cell::new(stats.home).set_alignment(CellAlignment::Right).fg(Color::Red),
            Cell::new(home.solar).set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
            Cell::new(home.battery)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(home.grid).set_alignment(CellAlignment::Right).fg(
                if home.grid >= KilowattHours::ONE_WATT_HOUR { Color::Red } else { Color::Reset },
            ),
        ]);
    }
    table
}
