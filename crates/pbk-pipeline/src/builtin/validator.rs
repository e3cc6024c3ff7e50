use std::collections::HashSet;

use pbk_core::expr::TIME_SYMBOL;
use pbk_core::{EntityKind, ExchangeDocument, Expr, ValidationReport};

use crate::collaborators::ModelValidator;
use crate::logger::StageLogger;

/// Checks modeling conventions on an annotated document.
///
/// Missing metadata is a warning. Structural problems (dangling references,
/// events writing to fixed quantities) are errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionValidator;

impl ModelValidator for ConventionValidator {
    fn validate(&self, document: &ExchangeDocument, logger: &mut StageLogger) -> ValidationReport {
        let mut report = ValidationReport::new();
        logger.debug(format!(
            "checking {} entities of model '{}'",
            document.entity_ids().len(),
            document.model_id
        ));

        if document.citation.is_none() {
            report.warning(None, "model carries no citation metadata");
        }

        for quantity in document.quantities() {
            if quantity.unit.is_none() {
                report.warning(Some(quantity.id), format!("{} has no unit", quantity.kind));
            }
            if quantity.annotations.is_empty() {
                report.warning(
                    Some(quantity.id),
                    format!("{} has no ontology annotation", quantity.kind),
                );
            }
        }

        for species in &document.species {
            if document.compartment(&species.compartment).is_none() {
                report.error(
                    Some(&species.id),
                    format!("species lives in undeclared compartment '{}'", species.compartment),
                );
            }
        }

        let math_scope = document
            .quantities()
            .iter()
            .map(|q| q.id)
            .chain([TIME_SYMBOL])
            .collect::<HashSet<_>>();

        for reaction in &document.reactions {
            for reference in reaction.reactants.iter().chain(&reaction.products) {
                if document.species(&reference.species).is_none() {
                    report.error(
                        Some(&reaction.id),
                        format!("reaction references undeclared species '{}'", reference.species),
                    );
                }
            }
            check_symbols(&mut report, &reaction.id, "rate law", &reaction.rate, &math_scope);
        }

        for event in &document.events {
            check_symbols(&mut report, &event.id, "trigger", &event.trigger, &math_scope);
            for assignment in &event.assignments {
                check_symbols(&mut report, &event.id, "assignment", &assignment.math, &math_scope);
                if let Some(problem) = assignment_target_problem(document, &assignment.variable) {
                    report.error(Some(&event.id), problem);
                }
            }
        }

        report
    }
}

fn check_symbols(
    report: &mut ValidationReport,
    owner: &str,
    what: &str,
    expr: &Expr,
    scope: &HashSet<&str>,
) {
    for symbol in expr.symbols() {
        if !scope.contains(symbol) {
            report.error(Some(owner), format!("{what} uses undeclared identifier '{symbol}'"));
        }
    }
}

fn assignment_target_problem(document: &ExchangeDocument, target: &str) -> Option<String> {
    match document.entity_kind(target) {
        None => Some(format!("event assigns to undeclared quantity '{target}'")),
        Some(EntityKind::Species) => {
            let species = document.species(target)?;
            if species.constant {
                Some(format!("event assigns to constant species '{target}'"))
            } else if species.boundary {
                Some(format!("event assigns to boundary species '{target}'"))
            } else {
                None
            }
        }
        Some(EntityKind::Parameter) => document
            .parameter(target)
            .filter(|p| p.constant)
            .map(|_| format!("event assigns to constant parameter '{target}'")),
        Some(EntityKind::Compartment) => None,
        Some(kind) => Some(format!("event assigns to {kind} '{target}'")),
    }
}
