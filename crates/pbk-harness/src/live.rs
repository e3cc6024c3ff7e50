//! Live model state: a private copy of a compiled document that scenarios
//! configure before simulation. The persisted artifact is never written back.

use std::collections::HashSet;

use pbk_core::expr::TIME_SYMBOL;
use pbk_core::{EntityKind, Event, ExchangeDocument, Expr, Species};
use tracing::debug;

use crate::error::{ConfigurationError, HarnessError};

#[derive(Debug, Clone, PartialEq)]
pub struct LiveModel {
    document: ExchangeDocument,
}

impl LiveModel {
    #[must_use]
    pub fn new(document: &ExchangeDocument) -> Self {
        Self {
            document: document.clone(),
        }
    }

    #[must_use]
    pub const fn document(&self) -> &ExchangeDocument {
        &self.document
    }

    /// # Errors
    ///
    /// `ConfigurationError::NotASpecies` if `species` is not declared.
    pub fn set_initial_amount(&mut self, species: &str, amount: f64) -> Result<(), HarnessError> {
        self.species_mut(species)?.initial_amount = amount;
        Ok(())
    }

    /// # Errors
    ///
    /// `ConfigurationError::NotASpecies` if `species` is not declared.
    pub fn set_constant(&mut self, species: &str, constant: bool) -> Result<(), HarnessError> {
        self.species_mut(species)?.constant = constant;
        Ok(())
    }

    /// # Errors
    ///
    /// `ConfigurationError::NotASpecies` if `species` is not declared.
    pub fn set_boundary(&mut self, species: &str, boundary: bool) -> Result<(), HarnessError> {
        self.species_mut(species)?.boundary = boundary;
        Ok(())
    }

    /// # Errors
    ///
    /// `ConfigurationError::UnknownQuantity` if no parameter `id` is declared.
    pub fn set_parameter(&mut self, id: &str, value: f64) -> Result<(), HarnessError> {
        let parameter = self
            .document
            .parameter_mut(id)
            .ok_or_else(|| ConfigurationError::UnknownQuantity(id.to_string()))?;
        parameter.value = value;
        Ok(())
    }

    /// Current value of a compartment size, species amount or parameter.
    #[must_use]
    pub fn value(&self, id: &str) -> Option<f64> {
        self.document.initial_value(id)
    }

    /// # Errors
    ///
    /// `ConfigurationError::DuplicateEvent` if an event with the same id exists.
    pub fn add_event(&mut self, event: Event) -> Result<(), HarnessError> {
        if self.document.event(&event.id).is_some() {
            return Err(ConfigurationError::DuplicateEvent(event.id).into());
        }
        debug!(event = %event.id, trigger = %event.trigger, "installing event");
        self.document.events.push(event);
        Ok(())
    }

    /// `time` followed by every species that reactions can change, in
    /// declaration order.
    #[must_use]
    pub fn default_selections(&self) -> Vec<String> {
        std::iter::once(TIME_SYMBOL.to_string())
            .chain(
                self.document
                    .species
                    .iter()
                    .filter(|s| !s.boundary)
                    .map(|s| s.id.clone()),
            )
            .collect()
    }

    /// Check the configured model and freeze it for simulation.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` when an expression names an undeclared
    /// identifier, a reaction names an undeclared species, or an event
    /// assigns to an undeclared or fixed quantity.
    pub fn regenerate(&self) -> Result<RegeneratedModel, HarnessError> {
        let doc = &self.document;
        let scope = doc
            .quantities()
            .iter()
            .map(|q| q.id)
            .chain([TIME_SYMBOL])
            .collect::<HashSet<_>>();

        for reaction in &doc.reactions {
            for reference in reaction.reactants.iter().chain(&reaction.products) {
                if doc.species(&reference.species).is_none() {
                    return Err(ConfigurationError::NotASpecies(reference.species.clone()).into());
                }
            }
            check_symbols(&scope, &reaction.rate, || format!("rate law of '{}'", reaction.id))?;
        }

        for event in &doc.events {
            check_symbols(&scope, &event.trigger, || format!("trigger of '{}'", event.id))?;
            for assignment in &event.assignments {
                check_target(doc, &assignment.variable)?;
                check_symbols(&scope, &assignment.math, || {
                    format!("assignment to '{}' in '{}'", assignment.variable, event.id)
                })?;
            }
        }

        Ok(RegeneratedModel {
            document: doc.clone(),
        })
    }

    fn species_mut(&mut self, id: &str) -> Result<&mut Species, ConfigurationError> {
        self.document
            .species_mut(id)
            .ok_or_else(|| ConfigurationError::NotASpecies(id.to_string()))
    }
}

/// A configured model whose references all resolve. Input to a
/// [`crate::engine::SimulationEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct RegeneratedModel {
    document: ExchangeDocument,
}

impl RegeneratedModel {
    #[must_use]
    pub const fn document(&self) -> &ExchangeDocument {
        &self.document
    }
}

fn check_symbols<F>(scope: &HashSet<&str>, expr: &Expr, context: F) -> Result<(), ConfigurationError>
where
    F: FnOnce() -> String,
{
    match expr.symbols().into_iter().find(|s| !scope.contains(s)) {
        Some(symbol) => Err(ConfigurationError::UndeclaredSymbol {
            context: context(),
            symbol: symbol.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_target(doc: &ExchangeDocument, target: &str) -> Result<(), ConfigurationError> {
    let fixed = |reason: &'static str| -> Result<(), ConfigurationError> {
        Err(ConfigurationError::FixedTarget {
            target: target.to_string(),
            reason,
        })
    };
    match doc.entity_kind(target) {
        Some(EntityKind::Species) => match doc.species(target) {
            Some(s) if s.constant => fixed("a constant species"),
            Some(s) if s.boundary => fixed("a boundary species"),
            _ => Ok(()),
        },
        Some(EntityKind::Parameter) => match doc.parameter(target) {
            Some(p) if p.constant => fixed("a constant parameter"),
            _ => Ok(()),
        },
        Some(EntityKind::Compartment) => Ok(()),
        _ => Err(ConfigurationError::UnknownQuantity(target.to_string())),
    }
}
