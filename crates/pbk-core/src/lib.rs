//! # pbk-core
//!
//! Core types shared by every PBK tooling crate.
//!
//! This crate provides:
//! - The structured exchange document (compartments, species, parameters,
//!   reactions, events) and its JSON codec helpers
//! - The expression language used by rate laws, event triggers and assignments
//! - Annotation tables, ontology qualifiers and citation metadata
//! - Validation reports
//! - Parametrisation tables grouped by model instance
//! - Sampled simulation results
//! - A small CSV reader/writer used by every tabular artifact

pub mod annotation;
pub mod citation;
pub mod csv;
pub mod diagnostics;
pub mod document;
pub mod errors;
pub mod expr;
pub mod parametrisation;
pub mod series;

pub use annotation::{AnnotationRecord, AnnotationTable, OntologyTerm, Qualifier};
pub use citation::{Author, Citation};
pub use diagnostics::{Diagnostic, Severity, ValidationReport};
pub use document::{
    Compartment, EntityKind, Event, EventAssignment, ExchangeDocument, Parameter, Reaction,
    Species, SpeciesReference,
};
pub use errors::CoreError;
pub use expr::{BinaryOp, Expr, UnaryOp};
pub use parametrisation::{ParameterRow, ParameterSet, ParametrisationTable};
pub use series::SimulationResult;
