//! # pbk-harness
//!
//! Drives compiled PBK models through exposure scenarios and checks external
//! parameter sets against them.
//!
//! - [`LiveModel`]: private, editable copy of a compiled document
//! - [`BolusDosing`] / [`DailyDosing`]: dose installation, including the
//!   periodic daily event and its washout window
//! - [`apply_parameter_set`] / [`load_parametrisation`]: apply one instance of
//!   a parametrisation file
//! - [`ParametrisationValidator`]: per-(file, instance) name checks
//! - [`SimulationEngine`] and the reference [`RungeKuttaEngine`]
//! - [`ScenarioRunner`]: sample, then write the table and chart

pub mod chart;
pub mod dosing;
pub mod engine;
pub mod error;
pub mod live;
pub mod params;
pub mod scenario;

pub use chart::{ChartRenderer, SvgChartRenderer};
pub use dosing::{BolusDosing, DAILY_EXPOSURE_EVENT, DailyDosing, DosingPlan};
pub use engine::{RungeKuttaEngine, SimulationEngine, SimulationRequest};
pub use error::{ConfigurationError, HarnessError};
pub use live::{LiveModel, RegeneratedModel};
pub use params::{
    FileFailure, ParametrisationReport, ParametrisationValidator, RowFailure, ScopeCheck,
    apply_parameter_set, load_parametrisation,
};
pub use scenario::{Scenario, ScenarioOutput, ScenarioRunner};
