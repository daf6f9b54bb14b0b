use std::path::PathBuf;

use clap::Parser;

use crate::{
    cli::settings::SettingsArgs,
    core::engine::Engine,
    prelude::*,
    snapshot::Snapshot,
    tables::{build_decision_table, build_trace_table},
};

#[derive(Parser)]
pub struct DecideArgs {
    /// JSON file with the system status, prices, and history.
    #[clap(long, env = "SNAPSHOT_PATH")]
    pub snapshot: PathBuf,

    /// Print the simulated hours.
    #[clap(long)]
    pub trace: bool,

    /// Print the decision as JSON instead of the table.
    #[clap(long)]
    pub json: bool,

    #[clap(flatten)]
    pub settings: SettingsArgs,
}

#[instrument(skip_all)]
pub fn decide(args: &DecideArgs) -> Result {
    let snapshot = Snapshot::read(&args.snapshot)?;
    let now = snapshot.now();
    let settings = snapshot.settings.clone().unwrap_or_else(|| args.settings.into());

    let evaluation = Engine::builder()
        .status(&snapshot.status)
        .current_price(&snapshot.current_price)
        .future_prices(&snapshot.future_prices)
        .history(&snapshot.history)
        .settings(&settings)
        .now(now)
        .evaluate();
    info!(
        n_model_hours = evaluation.model.len(),
        solar_trend = %evaluation.solar_trend,
        "evaluated",
    );

    if args.trace {
        match &evaluation.simulation {
            Some(simulation) => {
                info!(
                    lowest = ?simulation.min_residual_energy,
                    highest = ?simulation.max_residual_energy,
                    max_price = ?simulation.max_price,
                    "simulated",
                );
                println!(
                    "{}",
                    build_trace_table(
                        &simulation.trace,
                        snapshot.status.battery_capacity * settings.min_battery_soc,
                        simulation.deficit_at,
                    ),
                );
            }
            None => warn!("the decision was made without the simulation"),
        }
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&evaluation.decision)
                .context("failed to serialize the decision")?,
        );
    } else {
        println!("{}", build_decision_table(&evaluation.decision));
    }
    Ok(())
}
