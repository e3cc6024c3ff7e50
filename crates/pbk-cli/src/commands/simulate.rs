use std::path::PathBuf;

use anyhow::Context;
use pbk_config::ScenarioConfig;
use pbk_harness::{
    BolusDosing, DailyDosing, LiveModel, Scenario, ScenarioOutput, ScenarioRunner,
    load_parametrisation,
};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{BolusArgs, DailyArgs, ScenarioArgs, SimulateCommands};
use crate::commands::shared::read_document;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct SimulationSummary {
    scenario: String,
    model: String,
    days: u32,
    exposure_days: Option<u32>,
    washout_days: Option<u32>,
    parameters_applied: usize,
    samples: usize,
    table: PathBuf,
    chart: PathBuf,
}

/// Handle `pbk simulate`.
pub fn handle(
    action: &SimulateCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let summary = match action {
        SimulateCommands::Bolus(args) => bolus(args, ctx)?,
        SimulateCommands::Daily(args) => daily(args, ctx)?,
    };
    output(&summary, flags.format)
}

fn bolus(args: &BolusArgs, ctx: &AppContext) -> anyhow::Result<SimulationSummary> {
    let settings = &ctx.config.scenario;
    let document = read_document(&args.scenario.model)?;
    let mut model = LiveModel::new(&document);

    BolusDosing::new(&settings.input_species, intake(&args.scenario, settings))
        .install(&mut model)
        .context("failed to install single bolus")?;

    let id = args
        .scenario
        .id
        .clone()
        .unwrap_or_else(|| format!("{}_single_bolus", document.model_id));
    let written = run(ctx, &model, &args.scenario, id, args.days, model.default_selections())?;

    Ok(SimulationSummary {
        scenario: written.id,
        model: document.model_id,
        days: args.days,
        exposure_days: None,
        washout_days: None,
        parameters_applied: 0,
        samples: written.samples,
        table: written.table,
        chart: written.chart,
    })
}

fn daily(args: &DailyArgs, ctx: &AppContext) -> anyhow::Result<SimulationSummary> {
    let settings = &ctx.config.scenario;
    let document = read_document(&args.scenario.model)?;
    let mut model = LiveModel::new(&document);

    let parameters_applied = match (&args.params, &args.instance) {
        (Some(file), Some(instance)) => load_parametrisation(&mut model, file, instance)
            .with_context(|| {
                format!("failed to apply instance '{instance}' of {}", file.display())
            })?,
        _ => 0,
    };

    let plan = DailyDosing::new(
        &settings.input_species,
        intake(&args.scenario, settings),
        &settings.covariate,
        args.days_of_exposure,
    )
    .with_washout_divisor(settings.washout_divisor)
    .install(&mut model)
    .context("failed to install daily dosing")?;

    let mut selections = model.default_selections();
    if !selections.contains(&settings.covariate) {
        selections.push(settings.covariate.clone());
    }

    let id = args.scenario.id.clone().unwrap_or_else(|| {
        format!("{}_daily_{}d", document.model_id, args.days_of_exposure)
    });
    let written = run(ctx, &model, &args.scenario, id, plan.total_days(), selections)?;

    Ok(SimulationSummary {
        scenario: written.id,
        model: document.model_id,
        days: plan.total_days(),
        exposure_days: Some(plan.exposure_days),
        washout_days: Some(plan.washout_days),
        parameters_applied,
        samples: written.samples,
        table: written.table,
        chart: written.chart,
    })
}

fn intake(args: &ScenarioArgs, settings: &ScenarioConfig) -> f64 {
    args.intake.unwrap_or(settings.daily_intake)
}

fn run(
    ctx: &AppContext,
    model: &LiveModel,
    args: &ScenarioArgs,
    id: String,
    days: u32,
    selections: Vec<String>,
) -> anyhow::Result<ScenarioOutput> {
    let regenerated = model.regenerate().context("model is not ready for simulation")?;
    let scenario = Scenario {
        id,
        duration: f64::from(days),
        frequency: args.frequency.unwrap_or(ctx.config.scenario.frequency),
        selections,
    };

    let progress = Progress::spinner(&format!("simulating {}", scenario.id));
    let result = ScenarioRunner::new(ctx.output_dir()).run(&regenerated, &scenario);
    match &result {
        Ok(_) => progress.finish_clear(),
        Err(_) => progress.finish_err(&format!("scenario {} failed", scenario.id)),
    }
    result.with_context(|| format!("scenario '{}' failed", scenario.id))
}
