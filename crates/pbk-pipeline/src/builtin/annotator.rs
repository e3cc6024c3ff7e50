use pbk_core::{AnnotationTable, Citation, ExchangeDocument, OntologyTerm, Qualifier};

use crate::collaborators::{AnnotationSummary, ModelAnnotator};
use crate::error::AnnotationError;
use crate::logger::StageLogger;

/// Attaches table units and ontology terms to entities and the citation
/// record to the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct OntologyAnnotator;

impl ModelAnnotator for OntologyAnnotator {
    fn annotate(
        &self,
        document: &mut ExchangeDocument,
        table: &AnnotationTable,
        citation: &Citation,
        logger: &mut StageLogger,
    ) -> Result<AnnotationSummary, AnnotationError> {
        let missing = citation.missing_fields();
        if !missing.is_empty() {
            return Err(AnnotationError::IncompleteCitation(missing.join(", ")));
        }

        let mut summary = AnnotationSummary::default();
        for record in &table.records {
            let Some(slot) = document.annotatable_mut(&record.element_id) else {
                logger.error(format!(
                    "line {}: unknown element '{}'",
                    record.line, record.element_id
                ));
                summary.rejected += 1;
                continue;
            };

            if !record.unit.is_empty() {
                match slot.unit {
                    Some(unit) => *unit = Some(record.unit.clone()),
                    None => logger.warning(format!(
                        "line {}: {} '{}' has no unit slot; unit '{}' ignored",
                        record.line, slot.kind, record.element_id, record.unit
                    )),
                }
            }

            if record.is_blank() {
                logger.debug(format!("no resource for '{}'; skipped", record.element_id));
                summary.blank += 1;
                continue;
            }

            let qualifier = match record.qualifier.parse::<Qualifier>() {
                Ok(qualifier) => qualifier,
                Err(message) => {
                    logger.error(format!("line {}: {message}", record.line));
                    summary.rejected += 1;
                    continue;
                }
            };
            let term = OntologyTerm {
                qualifier,
                resource: record.resource.clone(),
            };
            if !slot.annotations.contains(&term) {
                slot.annotations.push(term);
            }
            summary.applied += 1;
        }

        document.citation = Some(citation.clone());
        logger.info(format!(
            "attached citation '{}' ({} authors)",
            citation.title,
            citation.authors.len()
        ));
        logger.info(format!(
            "applied {} ontology terms; {} rows without resource; {} rows rejected",
            summary.applied, summary.blank, summary.rejected
        ));
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use pbk_core::{Author, Expr, Parameter, Reaction};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::logger::{LogLevel, Stage};

    fn document() -> ExchangeDocument {
        let mut doc = ExchangeDocument::new("demo");
        doc.parameters.push(Parameter {
            id: "BW".into(),
            value: 70.0,
            constant: true,
            unit: None,
            annotations: Vec::new(),
        });
        doc.reactions.push(Reaction {
            id: "uptake".into(),
            reactants: Vec::new(),
            products: Vec::new(),
            rate: Expr::number(1.0),
            annotations: Vec::new(),
        });
        doc
    }

    fn citation() -> Citation {
        Citation {
            title: "Demo model".into(),
            authors: vec![Author {
                name: Some("Kinetics Working Group".into()),
                ..Author::default()
            }],
            ..Citation::default()
        }
    }

    #[test]
    fn applies_terms_units_and_citation() {
        let dir = TempDir::new().unwrap();
        let mut logger =
            StageLogger::create(&dir.path().join("a.log"), "demo", Stage::Annotation).unwrap();
        let table = AnnotationTable::from_csv(
            "element_id,element_type,unit,qualifier,resource,description\n\
             BW,parameter,kg,BQB_HAS_PROPERTY,http://purl.obolibrary.org/obo/PATO_0000128,body weight\n\
             BW,parameter,kg,,,\n\
             Liver,compartment,L,bqbiol:is,http://purl.obolibrary.org/obo/UBERON_0002107,\n\
             uptake,reaction,,bqbiol:loves,http://example.org/x,\n",
        )
        .unwrap();

        let mut doc = document();
        let summary = OntologyAnnotator
            .annotate(&mut doc, &table, &citation(), &mut logger)
            .unwrap();

        assert_eq!(
            summary,
            AnnotationSummary {
                applied: 1,
                blank: 1,
                rejected: 2
            }
        );
        let bw = doc.parameter("BW").unwrap();
        assert_eq!(bw.unit.as_deref(), Some("kg"));
        assert_eq!(bw.annotations[0].qualifier, Qualifier::BiolHasProperty);
        assert_eq!(doc.citation.as_ref().unwrap().title, "Demo model");
        assert_eq!(logger.count(LogLevel::Error), 2);
    }

    #[test]
    fn incomplete_citation_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut logger =
            StageLogger::create(&dir.path().join("a.log"), "demo", Stage::Annotation).unwrap();
        let mut doc = document();
        let result = OntologyAnnotator.annotate(
            &mut doc,
            &AnnotationTable::default(),
            &Citation::default(),
            &mut logger,
        );
        assert!(matches!(
            result,
            Err(AnnotationError::IncompleteCitation(fields)) if fields == "title, authors"
        ));
        assert!(doc.citation.is_none());
    }
}
