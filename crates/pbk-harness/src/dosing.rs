//! Dosing Event Scheduler.
//!
//! A daily schedule is one periodic event: it fires whenever simulation time
//! is a whole day strictly inside the exposure window, and adds
//! `dose * covariate` to the target using the covariate's value at the moment
//! the trigger fired. The target starts empty, so the first dose is the only
//! mass present at `t = 0`. Exposure is followed by an undosed washout window of
//! `floor(D / washout_divisor)` days.

use pbk_core::expr::TIME_SYMBOL;
use pbk_core::{BinaryOp, Event, EventAssignment, Expr};
use serde::Serialize;
use tracing::info;

use crate::error::{ConfigurationError, HarnessError};
use crate::live::LiveModel;

pub const DAILY_EXPOSURE_EVENT: &str = "oral_daily_exposure";
pub const DEFAULT_WASHOUT_DIVISOR: u32 = 10;

/// Clear the flags that would make injected mass disappear.
fn release_target(model: &mut LiveModel, target: &str) -> Result<(), HarnessError> {
    model.set_constant(target, false)?;
    model.set_boundary(target, false)
}

/// One dose placed in the target before the run starts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BolusDosing {
    pub target: String,
    pub intake: f64,
}

impl BolusDosing {
    #[must_use]
    pub fn new(target: impl Into<String>, intake: f64) -> Self {
        Self {
            target: target.into(),
            intake,
        }
    }

    /// # Errors
    ///
    /// `ConfigurationError::NotASpecies` if the target is not a species.
    pub fn install(&self, model: &mut LiveModel) -> Result<(), HarnessError> {
        release_target(model, &self.target)?;
        model.set_initial_amount(&self.target, self.intake)?;
        info!(target = %self.target, intake = self.intake, "installed single bolus");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyDosing {
    pub target: String,
    /// Dose per day, scaled by the covariate.
    pub dose: f64,
    /// Body-weight-like quantity sampled at each trigger.
    pub covariate: String,
    pub exposure_days: u32,
    pub washout_divisor: u32,
}

/// The time frame a daily schedule implies, and its event (none when `D = 0`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DosingPlan {
    pub exposure_days: u32,
    pub washout_days: u32,
    #[serde(skip)]
    pub event: Option<Event>,
}

impl DosingPlan {
    #[must_use]
    pub const fn total_days(&self) -> u32 {
        self.exposure_days + self.washout_days
    }
}

impl DailyDosing {
    #[must_use]
    pub fn new(
        target: impl Into<String>,
        dose: f64,
        covariate: impl Into<String>,
        exposure_days: u32,
    ) -> Self {
        Self {
            target: target.into(),
            dose,
            covariate: covariate.into(),
            exposure_days,
            washout_divisor: DEFAULT_WASHOUT_DIVISOR,
        }
    }

    #[must_use]
    pub const fn with_washout_divisor(mut self, divisor: u32) -> Self {
        self.washout_divisor = divisor;
        self
    }

    /// Build the plan without touching any model.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::InvalidSchedule` for a zero washout divisor or a
    /// non-finite dose.
    pub fn plan(&self) -> Result<DosingPlan, HarnessError> {
        if self.washout_divisor == 0 {
            return Err(ConfigurationError::InvalidSchedule(
                "washout divisor must be at least 1".to_string(),
            )
            .into());
        }
        if !self.dose.is_finite() {
            return Err(
                ConfigurationError::InvalidSchedule(format!("dose {} is not finite", self.dose))
                    .into(),
            );
        }
        Ok(DosingPlan {
            exposure_days: self.exposure_days,
            washout_days: self.exposure_days / self.washout_divisor,
            event: (self.exposure_days > 0).then(|| self.event()),
        })
    }

    /// Release and empty the target, check the covariate and install the event.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` when the target is not a species, the
    /// covariate is not a model quantity, or the schedule is invalid.
    pub fn install(&self, model: &mut LiveModel) -> Result<DosingPlan, HarnessError> {
        let plan = self.plan()?;
        release_target(model, &self.target)?;
        model.set_initial_amount(&self.target, 0.0)?;
        if model.value(&self.covariate).is_none() {
            return Err(ConfigurationError::UnknownQuantity(self.covariate.clone()).into());
        }
        if let Some(event) = &plan.event {
            model.add_event(event.clone())?;
        }
        info!(
            target = %self.target,
            exposure_days = plan.exposure_days,
            washout_days = plan.washout_days,
            "installed daily dosing"
        );
        Ok(plan)
    }

    /// `time % 1 == 0 && time < D` → `target = target + dose * covariate`.
    fn event(&self) -> Event {
        let time = || Expr::symbol(TIME_SYMBOL);
        let on_whole_day = Expr::binary(
            BinaryOp::Eq,
            Expr::binary(BinaryOp::Rem, time(), Expr::number(1.0)),
            Expr::number(0.0),
        );
        let in_window = Expr::binary(
            BinaryOp::Lt,
            time(),
            Expr::number(f64::from(self.exposure_days)),
        );
        let injection = Expr::binary(
            BinaryOp::Add,
            Expr::symbol(self.target.as_str()),
            Expr::binary(
                BinaryOp::Mul,
                Expr::number(self.dose),
                Expr::symbol(self.covariate.as_str()),
            ),
        );
        Event {
            id: DAILY_EXPOSURE_EVENT.to_string(),
            trigger: Expr::binary(BinaryOp::And, on_whole_day, in_window),
            assignments: vec![EventAssignment {
                variable: self.target.clone(),
                math: injection,
            }],
            use_values_from_trigger_time: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use pbk_core::{Compartment, ExchangeDocument, Parameter, Species};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn model() -> LiveModel {
        let mut doc = ExchangeDocument::new("demo");
        doc.compartments.push(Compartment {
            id: "Gut".into(),
            size: 1.0,
            unit: None,
            annotations: Vec::new(),
        });
        doc.species.push(Species {
            id: "AGut".into(),
            compartment: "Gut".into(),
            initial_amount: 0.0,
            constant: true,
            boundary: true,
            unit: None,
            annotations: Vec::new(),
        });
        doc.parameters.push(Parameter {
            id: "BW".into(),
            value: 70.0,
            constant: true,
            unit: None,
            annotations: Vec::new(),
        });
        LiveModel::new(&doc)
    }

    #[rstest]
    #[case(0, 0)]
    #[case(9, 0)]
    #[case(10, 1)]
    #[case(100, 10)]
    #[case(1000, 100)]
    #[case(1005, 100)]
    fn washout_is_a_tenth_of_exposure_rounded_down(#[case] days: u32, #[case] washout: u32) {
        let plan = DailyDosing::new("AGut", 1.0, "BW", days).plan().unwrap();
        assert_eq!(plan.washout_days, washout);
        assert_eq!(plan.total_days(), days + washout);
    }

    #[test]
    fn event_encodes_window_and_injection() {
        let plan = DailyDosing::new("AGut", 1.0, "BW", 10).plan().unwrap();
        let event = plan.event.unwrap();
        assert_eq!(event.id, DAILY_EXPOSURE_EVENT);
        assert_eq!(event.trigger.to_string(), "time % 1 == 0 && time < 10");
        assert_eq!(event.assignments[0].math.to_string(), "AGut + 1 * BW");
        assert!(event.use_values_from_trigger_time);
    }

    #[test]
    fn install_releases_target_flags() {
        let mut model = model();
        DailyDosing::new("AGut", 1.0, "BW", 10)
            .install(&mut model)
            .unwrap();
        let gut = model.document().species("AGut").unwrap();
        assert!(!gut.constant);
        assert!(!gut.boundary);
        assert_eq!(model.document().events.len(), 1);
        assert!(model.regenerate().is_ok());
    }

    #[test]
    fn install_empties_the_target() {
        let mut model = model();
        model.set_initial_amount("AGut", 5.0).unwrap();
        DailyDosing::new("AGut", 1.0, "BW", 3)
            .install(&mut model)
            .unwrap();
        assert_eq!(model.value("AGut"), Some(0.0));
    }

    #[test]
    fn zero_exposure_installs_no_event() {
        let mut model = model();
        let plan = DailyDosing::new("AGut", 1.0, "BW", 0)
            .install(&mut model)
            .unwrap();
        assert_eq!(plan.total_days(), 0);
        assert!(model.document().events.is_empty());
    }

    #[test]
    fn unknown_covariate_is_a_configuration_error() {
        let mut model = model();
        let result = DailyDosing::new("AGut", 1.0, "Weight", 10).install(&mut model);
        assert!(matches!(
            result,
            Err(HarnessError::Configuration(ConfigurationError::UnknownQuantity(id))) if id == "Weight"
        ));
    }

    #[test]
    fn bolus_sets_initial_amount() {
        let mut model = model();
        BolusDosing::new("AGut", 1.0).install(&mut model).unwrap();
        assert_eq!(model.value("AGut"), Some(1.0));
        assert!(!model.document().species("AGut").unwrap().constant);
    }
}
