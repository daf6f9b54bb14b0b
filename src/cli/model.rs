use std::{fs, path::PathBuf};

use clap::Parser;
use serde::Serialize;

use crate::{
    core::{
        model::{HourlyModel, HourlyProfile},
        trend::SolarTrend,
    },
    prelude::*,
    snapshot::Snapshot,
    tables::{build_history_table, build_model_table},
};

#[derive(Parser)]
pub struct ModelArgs {
    /// JSON file with the history.
    #[clap(long, env = "SNAPSHOT_PATH")]
    pub snapshot: PathBuf,

    /// Zero disables the outlier rejection.
    #[clap(long = "outlier-multiplier", env = "OUTLIER_MULTIPLIER", default_value = "3.0")]
    pub outlier_multiplier: f64,

    /// Also print the raw history.
    #[clap(long)]
    pub history: bool,

    /// Export the model into this TOML file.
    #[clap(long)]
    pub output: Option<PathBuf>,
}

#[derive(Serialize)]
struct ModelExport<'a> {
    solar_trend: f64,
    hours: Vec<HourExport<'a>>,
}

#[derive(Serialize)]
struct HourExport<'a> {
    hour: u32,

    #[serde(flatten)]
    profile: &'a HourlyProfile,
}

#[instrument(skip_all)]
pub fn model(args: &ModelArgs) -> Result {
    let snapshot = Snapshot::read(&args.snapshot)?;
    let outlier_multiplier = snapshot
        .settings
        .as_ref()
        .map_or(args.outlier_multiplier, |settings| settings.outlier_multiplier);

    let model = HourlyModel::build(&snapshot.history, outlier_multiplier);
    let solar_trend = SolarTrend::estimate(&snapshot.history, &model, snapshot.now());
    info!(n_hours = model.len(), %solar_trend, "built the model");

    if args.history {
        println!("{}", build_history_table(&snapshot.history));
    }
    if model.is_empty() {
        warn!("no history, the model is empty");
    } else {
        println!("{}", build_model_table(&model, solar_trend));
    }

    if let Some(path) = &args.output {
        let export = ModelExport {
            solar_trend: solar_trend.0,
            hours: model.iter().map(|(hour, profile)| HourExport { hour, profile }).collect(),
        };
        let contents = toml::to_string_pretty(&export).context("failed to serialize the model")?;
        fs::write(path, contents)
            .with_context(|| format!("failed to write `{}`", path.display()))?;
        info!(path = %path.display(), "exported the model");
    }
    Ok(())
}
