use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Exposure scenarios.
#[derive(Clone, Debug, Subcommand)]
pub enum SimulateCommands {
    /// One dose in the input compartment at time zero.
    Bolus(BolusArgs),
    /// A daily dose scaled by the covariate, followed by a washout window.
    Daily(DailyArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ScenarioArgs {
    /// Compiled model document.
    #[arg(long)]
    pub model: PathBuf,
    /// Dose amount (defaults to `scenario.daily_intake`).
    #[arg(long)]
    pub intake: Option<f64>,
    /// Samples per day (defaults to `scenario.frequency`).
    #[arg(long)]
    pub frequency: Option<u32>,
    /// Scenario identifier used for the output file names.
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct BolusArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,
    /// Simulated days.
    #[arg(long, default_value_t = 2)]
    pub days: u32,
}

#[derive(Clone, Debug, Args)]
pub struct DailyArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,
    /// Days with a daily dose.
    #[arg(long)]
    pub days_of_exposure: u32,
    /// Parametrisation file to apply before dosing.
    #[arg(long, requires = "instance")]
    pub params: Option<PathBuf>,
    /// Model instance to take from `--params`.
    #[arg(long, requires = "params")]
    pub instance: Option<String>,
}
