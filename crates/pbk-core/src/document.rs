//! The structured exchange document produced by model compilation.
//!
//! A document holds compartments, species, parameters, reactions and events.
//! Its constant parameters are the authoritative vocabulary that every
//! parametrisation file is checked against.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::annotation::OntologyTerm;
use crate::citation::Citation;
use crate::errors::CoreError;
use crate::expr::Expr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Compartment,
    Species,
    Parameter,
    Reaction,
    Event,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compartment => "compartment",
            Self::Species => "species",
            Self::Parameter => "parameter",
            Self::Reaction => "reaction",
            Self::Event => "event",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compartment {
    pub id: String,
    pub size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<OntologyTerm>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: String,
    pub compartment: String,
    pub initial_amount: f64,
    /// Held constant: neither reactions nor events may change it.
    #[serde(default)]
    pub constant: bool,
    /// Boundary condition: reactions do not change it.
    #[serde(default)]
    pub boundary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<OntologyTerm>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: String,
    pub value: f64,
    #[serde(default = "default_true")]
    pub constant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<OntologyTerm>,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesReference {
    pub species: String,
    #[serde(default = "default_stoichiometry")]
    pub stoichiometry: f64,
}

const fn default_stoichiometry() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: String,
    #[serde(default)]
    pub reactants: Vec<SpeciesReference>,
    #[serde(default)]
    pub products: Vec<SpeciesReference>,
    pub rate: Expr,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<OntologyTerm>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAssignment {
    pub variable: String,
    pub math: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub trigger: Expr,
    pub assignments: Vec<EventAssignment>,
    /// Evaluate assignments against the state captured when the trigger fired.
    #[serde(default)]
    pub use_values_from_trigger_time: bool,
}

/// Mutable view of an entity that can carry a unit and ontology terms.
pub struct AnnotatableMut<'a> {
    pub kind: EntityKind,
    /// `None` for entities without a unit slot (reactions).
    pub unit: Option<&'a mut Option<String>>,
    pub annotations: &'a mut Vec<OntologyTerm>,
}

/// Read-only view over compartments, species and parameters.
#[derive(Debug, Clone, Copy)]
pub struct QuantityView<'a> {
    pub id: &'a str,
    pub kind: EntityKind,
    pub unit: Option<&'a str>,
    pub annotations: &'a [OntologyTerm],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeDocument {
    pub model_id: String,
    /// Human-readable model name, when the source declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub compartments: Vec<Compartment>,
    #[serde(default)]
    pub species: Vec<Species>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<Citation>,
}

impl ExchangeDocument {
    #[must_use]
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            name: None,
            compartments: Vec::new(),
            species: Vec::new(),
            parameters: Vec::new(),
            reactions: Vec::new(),
            events: Vec::new(),
            citation: None,
        }
    }

    /// Decode a document from its JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Document` when the JSON does not describe a document.
    pub fn from_json(content: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Encode as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Document` if serialization fails.
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn compartment(&self, id: &str) -> Option<&Compartment> {
        self.compartments.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn species(&self, id: &str) -> Option<&Species> {
        self.species.iter().find(|s| s.id == id)
    }

    pub fn species_mut(&mut self, id: &str) -> Option<&mut Species> {
        self.species.iter_mut().find(|s| s.id == id)
    }

    #[must_use]
    pub fn parameter(&self, id: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.id == id)
    }

    pub fn parameter_mut(&mut self, id: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.id == id)
    }

    #[must_use]
    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Kind of the entity declared under `id`, if any.
    #[must_use]
    pub fn entity_kind(&self, id: &str) -> Option<EntityKind> {
        if self.compartment(id).is_some() {
            Some(EntityKind::Compartment)
        } else if self.species(id).is_some() {
            Some(EntityKind::Species)
        } else if self.parameter(id).is_some() {
            Some(EntityKind::Parameter)
        } else if self.reactions.iter().any(|r| r.id == id) {
            Some(EntityKind::Reaction)
        } else if self.event(id).is_some() {
            Some(EntityKind::Event)
        } else {
            None
        }
    }

    /// Every declared identifier in declaration order: compartments, species,
    /// parameters, reactions, events.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<&str> {
        self.compartments
            .iter()
            .map(|c| c.id.as_str())
            .chain(self.species.iter().map(|s| s.id.as_str()))
            .chain(self.parameters.iter().map(|p| p.id.as_str()))
            .chain(self.reactions.iter().map(|r| r.id.as_str()))
            .chain(self.events.iter().map(|e| e.id.as_str()))
            .collect()
    }

    /// Identifiers of the declared constant parameters.
    #[must_use]
    pub fn constant_parameter_ids(&self) -> BTreeSet<&str> {
        self.parameters
            .iter()
            .filter(|p| p.constant)
            .map(|p| p.id.as_str())
            .collect()
    }

    /// Compartments, species and parameters in declaration order.
    #[must_use]
    pub fn quantities(&self) -> Vec<QuantityView<'_>> {
        let compartments = self.compartments.iter().map(|c| QuantityView {
            id: &c.id,
            kind: EntityKind::Compartment,
            unit: c.unit.as_deref(),
            annotations: &c.annotations,
        });
        let species = self.species.iter().map(|s| QuantityView {
            id: &s.id,
            kind: EntityKind::Species,
            unit: s.unit.as_deref(),
            annotations: &s.annotations,
        });
        let parameters = self.parameters.iter().map(|p| QuantityView {
            id: &p.id,
            kind: EntityKind::Parameter,
            unit: p.unit.as_deref(),
            annotations: &p.annotations,
        });
        compartments.chain(species).chain(parameters).collect()
    }

    /// Mutable unit/annotation slots of the entity declared under `id`.
    pub fn annotatable_mut(&mut self, id: &str) -> Option<AnnotatableMut<'_>> {
        if let Some(c) = self.compartments.iter_mut().find(|c| c.id == id) {
            return Some(AnnotatableMut {
                kind: EntityKind::Compartment,
                unit: Some(&mut c.unit),
                annotations: &mut c.annotations,
            });
        }
        if let Some(s) = self.species.iter_mut().find(|s| s.id == id) {
            return Some(AnnotatableMut {
                kind: EntityKind::Species,
                unit: Some(&mut s.unit),
                annotations: &mut s.annotations,
            });
        }
        if let Some(p) = self.parameters.iter_mut().find(|p| p.id == id) {
            return Some(AnnotatableMut {
                kind: EntityKind::Parameter,
                unit: Some(&mut p.unit),
                annotations: &mut p.annotations,
            });
        }
        self.reactions
            .iter_mut()
            .find(|r| r.id == id)
            .map(|r| AnnotatableMut {
                kind: EntityKind::Reaction,
                unit: None,
                annotations: &mut r.annotations,
            })
    }

    /// Initial value of a compartment size, species amount or parameter.
    #[must_use]
    pub fn initial_value(&self, id: &str) -> Option<f64> {
        self.compartment(id)
            .map(|c| c.size)
            .or_else(|| self.species(id).map(|s| s.initial_amount))
            .or_else(|| self.parameter(id).map(|p| p.value))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::annotation::Qualifier;

    fn sample() -> ExchangeDocument {
        let mut doc = ExchangeDocument::new("PBK_demo");
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
            constant: false,
            boundary: false,
            unit: Some("umol".into()),
            annotations: Vec::new(),
        });
        for (id, constant) in [("BW", true), ("ka", true), ("Vfree", false)] {
            doc.parameters.push(Parameter {
                id: id.into(),
                value: 1.0,
                constant,
                unit: None,
                annotations: Vec::new(),
            });
        }
        doc.reactions.push(Reaction {
            id: "absorption".into(),
            reactants: vec![SpeciesReference {
                species: "AGut".into(),
                stoichiometry: 1.0,
            }],
            products: Vec::new(),
            rate: Expr::parse("ka * AGut").unwrap(),
            annotations: Vec::new(),
        });
        doc
    }

    #[test]
    fn constant_parameters_form_the_vocabulary() {
        let doc = sample();
        let vocabulary = doc.constant_parameter_ids();
        assert!(vocabulary.contains("BW"));
        assert!(vocabulary.contains("ka"));
        assert!(!vocabulary.contains("Vfree"));
        assert!(!vocabulary.contains("AGut"));
    }

    #[test]
    fn entity_kind_resolves_every_declaration() {
        let doc = sample();
        assert_eq!(doc.entity_kind("Gut"), Some(EntityKind::Compartment));
        assert_eq!(doc.entity_kind("AGut"), Some(EntityKind::Species));
        assert_eq!(doc.entity_kind("BW"), Some(EntityKind::Parameter));
        assert_eq!(doc.entity_kind("absorption"), Some(EntityKind::Reaction));
        assert_eq!(doc.entity_kind("nope"), None);
        assert_eq!(
            doc.entity_ids(),
            vec!["Gut", "AGut", "BW", "ka", "Vfree", "absorption"]
        );
    }

    #[test]
    fn quantities_follow_declaration_order() {
        let doc = sample();
        let ids = doc.quantities().iter().map(|q| q.id).collect::<Vec<_>>();
        assert_eq!(ids, vec!["Gut", "AGut", "BW", "ka", "Vfree"]);
    }

    #[test]
    fn annotatable_mut_writes_unit_and_terms() {
        let mut doc = sample();
        let slot = doc.annotatable_mut("BW").unwrap();
        *slot.unit.unwrap() = Some("kg".into());
        slot.annotations.push(OntologyTerm {
            qualifier: Qualifier::BiolIs,
            resource: "http://example.org/body-weight".into(),
        });

        let bw = doc.parameter("BW").unwrap();
        assert_eq!(bw.unit.as_deref(), Some("kg"));
        assert_eq!(bw.annotations.len(), 1);
        assert!(doc.annotatable_mut("absorption").unwrap().unit.is_none());
    }

    #[test]
    fn json_encoding_keeps_expressions_readable() {
        let doc = sample();
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"rate\": \"ka * AGut\""));
        assert_eq!(ExchangeDocument::from_json(&json).unwrap(), doc);
    }
}
