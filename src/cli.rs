mod decide;
mod model;
mod settings;

use clap::{Parser, Subcommand};

pub use self::{
    decide::{DecideArgs, decide},
    model::{ModelArgs, model},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: decide what the battery and the solar inverter should do right now.
    #[clap(name = "decide")]
    Decide(Box<DecideArgs>),

    /// Show the hourly model and the solar trend built from the history.
    #[clap(name = "model")]
    Model(Box<ModelArgs>),
}
