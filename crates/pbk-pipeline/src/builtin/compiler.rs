//! Reference compiler for a small line-oriented reaction-network language.
//!
//! ```text
//! model PBK_demo
//!   compartment Gut = 1
//!   species AGut in Gut = 0          // `$AGut` marks a boundary species
//!   const species Cref in Gut = 1
//!   ka = 1.2                         // constant parameter
//!   var Vfree = 0                    // non-constant parameter
//!   absorption: AGut -> ; ka * AGut
//! end
//! ```

use std::collections::HashMap;

use pbk_core::{
    Compartment, ExchangeDocument, Expr, Parameter, Reaction, Species, SpeciesReference,
};

use crate::collaborators::{ModelCompiler, SourceModel};
use crate::error::SourceError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReactionNetworkCompiler;

impl ModelCompiler for ReactionNetworkCompiler {
    fn compile(&self, source: &SourceModel) -> Result<ExchangeDocument, SourceError> {
        let mut builder = Builder::new(&source.name);
        for (index, raw) in source.text.lines().enumerate() {
            let text = strip_comment(raw).trim();
            if !text.is_empty() {
                builder.statement(index + 1, text)?;
            }
        }
        builder.finish()
    }
}

struct Builder {
    doc: ExchangeDocument,
    declared: HashMap<String, usize>,
    species_lines: Vec<usize>,
    reaction_lines: Vec<usize>,
    ended: bool,
}

impl Builder {
    fn new(source_name: &str) -> Self {
        let mut doc = ExchangeDocument::new(source_name);
        doc.name = Some(source_name.to_string());
        Self {
            doc,
            declared: HashMap::new(),
            species_lines: Vec::new(),
            reaction_lines: Vec::new(),
            ended: false,
        }
    }

    fn statement(&mut self, line: usize, text: &str) -> Result<(), SourceError> {
        if self.ended {
            return Err(syntax(line, "statement after 'end'"));
        }
        if text == "end" {
            self.ended = true;
            return Ok(());
        }
        if let Some(rest) = keyword(text, "model") {
            let id = rest.trim_start_matches('*').trim_end_matches("()").trim();
            self.doc.model_id = identifier(line, id)?.to_string();
            return Ok(());
        }
        if text.contains("->") {
            return self.reaction(line, text);
        }

        let text = text.trim_end_matches(';').trim_end();
        if let Some(rest) = keyword(text, "compartment") {
            let (id, size) = assignment(line, rest, 1.0)?;
            self.declare(line, id)?;
            self.doc.compartments.push(Compartment {
                id: id.to_string(),
                size,
                unit: None,
                annotations: Vec::new(),
            });
            return Ok(());
        }
        if let Some(rest) = keyword(text, "const").and_then(|r| keyword(r, "species")) {
            return self.species(line, rest, true);
        }
        if let Some(rest) = keyword(text, "species") {
            return self.species(line, rest, false);
        }
        let (constant, rest) = match (keyword(text, "const"), keyword(text, "var")) {
            (Some(rest), _) => (true, rest),
            (_, Some(rest)) => (false, rest),
            _ => (true, text),
        };
        if !rest.contains('=') {
            return Err(syntax(line, format!("unrecognised statement '{text}'")));
        }
        let (id, value) = assignment(line, rest, 0.0)?;
        self.declare(line, id)?;
        self.doc.parameters.push(Parameter {
            id: id.to_string(),
            value,
            constant,
            unit: None,
            annotations: Vec::new(),
        });
        Ok(())
    }

    fn species(&mut self, line: usize, rest: &str, constant: bool) -> Result<(), SourceError> {
        let (decl, amount) = match rest.split_once('=') {
            Some((decl, value)) => (decl, number(line, value)?),
            None => (rest, 0.0),
        };
        let parts = decl.split_whitespace().collect::<Vec<_>>();
        let [name, "in", compartment] = parts.as_slice() else {
            return Err(syntax(
                line,
                "species declaration must read 'species ID in COMPARTMENT [= AMOUNT]'",
            ));
        };
        let (boundary, name) = name
            .strip_prefix('$')
            .map_or((false, *name), |stripped| (true, stripped));
        let id = identifier(line, name)?;
        let compartment = identifier(line, compartment)?;
        self.declare(line, id)?;
        self.species_lines.push(line);
        self.doc.species.push(Species {
            id: id.to_string(),
            compartment: compartment.to_string(),
            initial_amount: amount,
            constant,
            boundary,
            unit: None,
            annotations: Vec::new(),
        });
        Ok(())
    }

    fn reaction(&mut self, line: usize, text: &str) -> Result<(), SourceError> {
        let Some((id, rest)) = text.split_once(':') else {
            return Err(syntax(line, "reaction must start with 'ID:'"));
        };
        let Some((equation, rate)) = rest.split_once(';') else {
            return Err(syntax(line, "reaction needs a rate law after ';'"));
        };
        let Some((lhs, rhs)) = equation.split_once("->") else {
            return Err(syntax(line, "reaction needs '->'"));
        };
        let id = identifier(line, id.trim())?;
        let rate = rate.trim().trim_end_matches(';');
        let rate = Expr::parse(rate).map_err(|error| syntax(line, error.to_string()))?;
        let reactants = side(line, lhs)?;
        let products = side(line, rhs)?;

        self.declare(line, id)?;
        self.reaction_lines.push(line);
        self.doc.reactions.push(Reaction {
            id: id.to_string(),
            reactants,
            products,
            rate,
            annotations: Vec::new(),
        });
        Ok(())
    }

    fn declare(&mut self, line: usize, id: &str) -> Result<(), SourceError> {
        if self.declared.insert(id.to_string(), line).is_some() {
            return Err(SourceError::Duplicate {
                line,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn finish(self) -> Result<ExchangeDocument, SourceError> {
        for (species, &line) in self.doc.species.iter().zip(&self.species_lines) {
            if self.doc.compartment(&species.compartment).is_none() {
                return Err(SourceError::Undeclared {
                    line,
                    kind: "compartment",
                    id: species.compartment.clone(),
                });
            }
        }
        for (reaction, &line) in self.doc.reactions.iter().zip(&self.reaction_lines) {
            let participants = reaction.reactants.iter().chain(&reaction.products);
            for reference in participants {
                if self.doc.species(&reference.species).is_none() {
                    return Err(SourceError::Undeclared {
                        line,
                        kind: "species",
                        id: reference.species.clone(),
                    });
                }
            }
        }
        Ok(self.doc)
    }
}

fn strip_comment(line: &str) -> &str {
    let end = [line.find('#'), line.find("//")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(line.len());
    &line[..end]
}

/// Remainder after a leading keyword, if `text` starts with it as a whole word.
fn keyword<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(word)?;
    rest.starts_with(char::is_whitespace).then(|| rest.trim_start())
}

fn identifier(line: usize, text: &str) -> Result<&str, SourceError> {
    let mut chars = text.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(text)
    } else {
        Err(syntax(line, format!("invalid identifier '{text}'")))
    }
}

/// A literal or a constant arithmetic expression such as `1/24`.
fn number(line: usize, text: &str) -> Result<f64, SourceError> {
    let expr = Expr::parse(text.trim()).map_err(|error| syntax(line, error.to_string()))?;
    expr.eval(&|_: &str| None)
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| syntax(line, format!("'{}' is not a constant number", text.trim())))
}

fn assignment(line: usize, text: &str, default: f64) -> Result<(&str, f64), SourceError> {
    match text.split_once('=') {
        Some((id, value)) => Ok((identifier(line, id.trim())?, number(line, value)?)),
        None => Ok((identifier(line, text.trim())?, default)),
    }
}

fn side(line: usize, text: &str) -> Result<Vec<SpeciesReference>, SourceError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split('+')
        .map(|term| {
            let parts = term.split_whitespace().collect::<Vec<_>>();
            let (stoichiometry, species) = match parts.as_slice() {
                [species] => (1.0, *species),
                [count, species] => (number(line, count)?, *species),
                _ => return Err(syntax(line, format!("malformed reaction term '{}'", term.trim()))),
            };
            Ok(SpeciesReference {
                species: identifier(line, species)?.to_string(),
                stoichiometry,
            })
        })
        .collect()
}

fn syntax(line: usize, message: impl Into<String>) -> SourceError {
    SourceError::Syntax {
        line,
        message: message.into(),
    }
}
