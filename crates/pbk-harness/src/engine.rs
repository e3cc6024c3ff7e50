//! Simulation engines.
//!
//! [`RungeKuttaEngine`] integrates the reaction network with classic RK4 on a
//! sub-stepped uniform grid. Species symbols evaluate to amounts. Event
//! triggers are checked at t = 0 and after every integration step.

use std::collections::HashMap;

use pbk_core::expr::TIME_SYMBOL;
use pbk_core::{Event, ExchangeDocument, Expr, SimulationResult};
use serde::Serialize;
use tracing::debug;

use crate::error::{ConfigurationError, HarnessError};
use crate::live::RegeneratedModel;

/// What to sample: `duration * frequency + 1` evenly spaced points over
/// `[0, duration]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRequest {
    pub duration: f64,
    /// Samples per unit time.
    pub frequency: u32,
    pub selections: Vec<String>,
}

impl SimulationRequest {
    /// Number of sampling intervals.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::InvalidSchedule` unless `duration` is finite and
    /// non-negative, `frequency` is positive and `duration * frequency` is whole.
    pub fn intervals(&self) -> Result<u32, ConfigurationError> {
        if self.frequency == 0 {
            return Err(ConfigurationError::InvalidSchedule(
                "frequency must be at least 1".to_string(),
            ));
        }
        let exact = self.duration * f64::from(self.frequency);
        let rounded = exact.round();
        let whole = (exact - rounded).abs() <= 1e-9;
        if !exact.is_finite() || exact < 0.0 || !whole || rounded >= f64::from(u32::MAX) {
            return Err(ConfigurationError::InvalidSchedule(format!(
                "duration {} at frequency {} does not give a whole number of samples",
                self.duration, self.frequency
            )));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let intervals = rounded as u32;
        Ok(intervals)
    }

    /// Sample times, both endpoints included.
    ///
    /// # Errors
    ///
    /// Same as [`SimulationRequest::intervals`].
    pub fn sample_times(&self) -> Result<Vec<f64>, ConfigurationError> {
        let intervals = self.intervals()?;
        if intervals == 0 {
            return Ok(vec![0.0]);
        }
        let span = f64::from(intervals);
        Ok((0..=intervals)
            .map(|i| f64::from(i) * self.duration / span)
            .collect())
    }
}

pub trait SimulationEngine {
    /// # Errors
    ///
    /// Returns a `ConfigurationError` for invalid requests or unknown
    /// selections, and `HarnessError::Simulation` when integration diverges.
    fn simulate(
        &self,
        model: &RegeneratedModel,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, HarnessError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RungeKuttaEngine {
    /// RK4 steps between consecutive samples.
    pub steps_per_sample: u32,
}

impl Default for RungeKuttaEngine {
    fn default() -> Self {
        Self {
            steps_per_sample: 20,
        }
    }
}

impl SimulationEngine for RungeKuttaEngine {
    fn simulate(
        &self,
        model: &RegeneratedModel,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, HarnessError> {
        let system = System::new(model.document());
        let columns = request
            .selections
            .iter()
            .map(|name| system.column(name))
            .collect::<Result<Vec<_>, _>>()?;
        let times = request.sample_times()?;
        let steps = self.steps_per_sample.max(1);

        let mut state = system.initial_state();
        let mut triggered = vec![false; system.events.len()];
        let mut result = SimulationResult::new(request.selections.clone());
        let mut previous_time = 0.0;

        for &time in &times {
            if time > previous_time {
                let h = (time - previous_time) / f64::from(steps);
                for step in 1..=steps {
                    system.rk4_step(previous_time + f64::from(step - 1) * h, h, &mut state)?;
                    // The last step lands exactly on the sample time.
                    let now = if step == steps {
                        time
                    } else {
                        previous_time + f64::from(step) * h
                    };
                    system.fire_events(now, &mut state, &mut triggered)?;
                }
                if let Some(index) = state.iter().position(|v| !v.is_finite()) {
                    return Err(HarnessError::Simulation {
                        time,
                        message: format!("'{}' is not finite", system.names[index]),
                    });
                }
            } else {
                system.fire_events(time, &mut state, &mut triggered)?;
            }
            result.rows.push(
                columns
                    .iter()
                    .map(|column| column.map_or(time, |index| state[index]))
                    .collect(),
            );
            previous_time = time;
        }

        debug!(
            model = %model.document().model_id,
            samples = result.len(),
            "simulation finished"
        );
        Ok(result)
    }
}

struct CompiledReaction<'a> {
    rate: &'a Expr,
    /// (state index, net stoichiometry) of every species the reaction moves.
    changes: Vec<(usize, f64)>,
}

struct System<'a> {
    document: &'a ExchangeDocument,
    names: Vec<&'a str>,
    index: HashMap<&'a str, usize>,
    reactions: Vec<CompiledReaction<'a>>,
    events: &'a [Event],
}

impl<'a> System<'a> {
    fn new(document: &'a ExchangeDocument) -> Self {
        let names = document.quantities().iter().map(|q| q.id).collect::<Vec<_>>();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, i))
            .collect::<HashMap<_, _>>();

        let reactions = document
            .reactions
            .iter()
            .map(|reaction| {
                let mut changes: Vec<(usize, f64)> = Vec::new();
                let reactants = reaction.reactants.iter().map(|r| (r, -1.0));
                let products = reaction.products.iter().map(|r| (r, 1.0));
                for (reference, sign) in reactants.chain(products) {
                    let moves = document
                        .species(&reference.species)
                        .is_some_and(|s| !s.constant && !s.boundary);
                    let Some(&i) = index.get(reference.species.as_str()).filter(|_| moves) else {
                        continue;
                    };
                    match changes.iter_mut().find(|(j, _)| *j == i) {
                        Some((_, net)) => *net += sign * reference.stoichiometry,
                        None => changes.push((i, sign * reference.stoichiometry)),
                    }
                }
                CompiledReaction {
                    rate: &reaction.rate,
                    changes,
                }
            })
            .collect();

        Self {
            document,
            names,
            index,
            reactions,
            events: &document.events,
        }
    }

    fn initial_state(&self) -> Vec<f64> {
        self.names
            .iter()
            .map(|name| self.document.initial_value(name).unwrap_or_default())
            .collect()
    }

    /// `None` selects time.
    fn column(&self, name: &str) -> Result<Option<usize>, ConfigurationError> {
        if name == TIME_SYMBOL {
            return Ok(None);
        }
        self.index
            .get(name)
            .map(|&i| Some(i))
            .ok_or_else(|| ConfigurationError::UnknownSelection(name.to_string()))
    }

    fn lookup<'s>(&'s self, time: f64, state: &'s [f64]) -> impl Fn(&str) -> Option<f64> + 's {
        move |name: &str| -> Option<f64> {
            if name == TIME_SYMBOL {
                Some(time)
            } else {
                self.index.get(name).map(|&i| state[i])
            }
        }
    }

    fn derivatives(&self, time: f64, state: &[f64], out: &mut [f64]) -> Result<(), HarnessError> {
        out.iter_mut().for_each(|d| *d = 0.0);
        let scope = self.lookup(time, state);
        for reaction in &self.reactions {
            if reaction.changes.is_empty() {
                continue;
            }
            let rate = reaction.rate.eval(&scope)?;
            for &(i, net) in &reaction.changes {
                out[i] += net * rate;
            }
        }
        Ok(())
    }

    fn rk4_step(&self, time: f64, h: f64, state: &mut [f64]) -> Result<(), HarnessError> {
        let n = state.len();
        let mut k1 = vec![0.0; n];
        let mut k2 = vec![0.0; n];
        let mut k3 = vec![0.0; n];
        let mut k4 = vec![0.0; n];
        let mut probe = vec![0.0; n];

        self.derivatives(time, state, &mut k1)?;
        offset(&mut probe, state, 0.5 * h, &k1);
        self.derivatives(time + 0.5 * h, &probe, &mut k2)?;
        offset(&mut probe, state, 0.5 * h, &k2);
        self.derivatives(time + 0.5 * h, &probe, &mut k3)?;
        offset(&mut probe, state, h, &k3);
        self.derivatives(time + h, &probe, &mut k4)?;

        for (i, value) in state.iter_mut().enumerate() {
            *value += h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
        }
        Ok(())
    }

    /// Fire every event whose trigger went from false to true at `time`.
    ///
    /// Triggers are all evaluated against the state before any event runs.
    /// Events then run in declaration order; each one evaluates its
    /// assignments against that snapshot when it uses trigger-time values,
    /// otherwise against the state left by earlier events.
    fn fire_events(
        &self,
        time: f64,
        state: &mut [f64],
        triggered: &mut [bool],
    ) -> Result<(), HarnessError> {
        if self.events.is_empty() {
            return Ok(());
        }
        let snapshot = state.to_vec();
        let mut firing = Vec::new();
        {
            let scope = self.lookup(time, &snapshot);
            for (k, event) in self.events.iter().enumerate() {
                let now = event.trigger.holds(&scope)?;
                if now && !triggered[k] {
                    firing.push(k);
                }
                triggered[k] = now;
            }
        }

        for k in firing {
            let event = &self.events[k];
            let values = {
                let current = state.to_vec();
                let basis: &[f64] = if event.use_values_from_trigger_time {
                    &snapshot
                } else {
                    &current
                };
                let scope = self.lookup(time, basis);
                event
                    .assignments
                    .iter()
                    .map(|a| -> Result<(usize, f64), HarnessError> {
                        Ok((self.target(&a.variable)?, a.math.eval(&scope)?))
                    })
                    .collect::<Result<Vec<_>, _>>()?
            };
            for (i, value) in values {
                state[i] = value;
            }
            debug!(event = %event.id, time, "event fired");
        }
        Ok(())
    }

    fn target(&self, name: &str) -> Result<usize, ConfigurationError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownQuantity(name.to_string()))
    }
}

/// `probe = base + scale * slope`
fn offset(probe: &mut [f64], base: &[f64], scale: f64, slope: &[f64]) {
    for ((p, b), d) in probe.iter_mut().zip(base).zip(slope) {
        *p = b + scale * d;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(2.0, 24, 49)]
    #[case(0.0, 24, 1)]
    #[case(11.0, 24, 265)]
    #[case(0.5, 4, 3)]
    fn sample_count_is_duration_times_frequency_plus_one(
        #[case] duration: f64,
        #[case] frequency: u32,
        #[case] samples: usize,
    ) {
        let request = SimulationRequest {
            duration,
            frequency,
            selections: Vec::new(),
        };
        let times = request.sample_times().unwrap();
        assert_eq!(times.len(), samples);
        assert_eq!(times.first().copied(), Some(0.0));
        assert_eq!(times.last().copied(), Some(duration));
    }

    #[test]
    fn day_boundaries_are_exact_sample_times() {
        let request = SimulationRequest {
            duration: 11.0,
            frequency: 24,
            selections: Vec::new(),
        };
        let times = request.sample_times().unwrap();
        for day in 0..=11_u32 {
            assert_eq!(times[day as usize * 24], f64::from(day));
        }
    }

    #[test]
    fn fractional_sample_counts_are_rejected() {
        let request = SimulationRequest {
            duration: 0.3,
            frequency: 1,
            selections: Vec::new(),
        };
        assert!(request.intervals().is_err());
        let request = SimulationRequest {
            duration: 1.0,
            frequency: 0,
            selections: Vec::new(),
        };
        assert!(request.intervals().is_err());
    }
}
