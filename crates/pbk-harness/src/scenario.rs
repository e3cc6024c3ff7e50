//! Scenario Runner: simulate a configured model and persist the sampled
//! series as `{id}.csv` plus a chart of the same selections.

use std::fs;
use std::path::PathBuf;

use pbk_core::SimulationResult;
use pbk_core::expr::TIME_SYMBOL;
use serde::Serialize;
use tracing::info;

use crate::chart::{ChartRenderer, SvgChartRenderer};
use crate::engine::{RungeKuttaEngine, SimulationEngine, SimulationRequest};
use crate::error::HarnessError;
use crate::live::RegeneratedModel;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub id: String,
    pub duration: f64,
    pub frequency: u32,
    pub selections: Vec<String>,
}

impl Scenario {
    /// The engine request. `time` leads the selections when they omit it, so
    /// every table and chart has a time axis.
    fn request(&self) -> SimulationRequest {
        let mut selections = self.selections.clone();
        if !selections.iter().any(|s| s == TIME_SYMBOL) {
            selections.insert(0, TIME_SYMBOL.to_string());
        }
        SimulationRequest {
            duration: self.duration,
            frequency: self.frequency,
            selections,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutput {
    pub id: String,
    pub samples: usize,
    pub table: PathBuf,
    pub chart: PathBuf,
    #[serde(skip)]
    pub result: SimulationResult,
}

pub struct ScenarioRunner {
    engine: Box<dyn SimulationEngine>,
    renderer: Box<dyn ChartRenderer>,
    output_dir: PathBuf,
}

impl ScenarioRunner {
    /// Runner with the RK4 engine and SVG charts.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine: Box::new(RungeKuttaEngine::default()),
            renderer: Box::new(SvgChartRenderer::default()),
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn with_engine(mut self, engine: Box<dyn SimulationEngine>) -> Self {
        self.engine = engine;
        self
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Box<dyn ChartRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Simulate without persisting anything.
    ///
    /// # Errors
    ///
    /// Propagates the engine's errors.
    pub fn simulate(
        &self,
        model: &RegeneratedModel,
        scenario: &Scenario,
    ) -> Result<SimulationResult, HarnessError> {
        self.engine.simulate(model, &scenario.request())
    }

    /// Simulate and write the table and chart, creating the output directory
    /// if needed.
    ///
    /// # Errors
    ///
    /// Propagates the engine's errors and any I/O error while writing.
    pub fn run(
        &self,
        model: &RegeneratedModel,
        scenario: &Scenario,
    ) -> Result<ScenarioOutput, HarnessError> {
        let result = self.simulate(model, scenario)?;

        fs::create_dir_all(&self.output_dir)?;
        let table = self.output_dir.join(format!("{}.csv", scenario.id));
        let chart = self
            .output_dir
            .join(format!("{}.{}", scenario.id, self.renderer.extension()));
        fs::write(&table, result.to_csv())?;
        fs::write(&chart, self.renderer.render(&scenario.id, &result))?;

        info!(
            scenario = %scenario.id,
            samples = result.len(),
            table = %table.display(),
            "scenario written"
        );
        Ok(ScenarioOutput {
            id: scenario.id.clone(),
            samples: result.len(),
            table,
            chart,
            result,
        })
    }
}
