use pbk_core::{AnnotationRecord, AnnotationTable, ExchangeDocument};

use crate::collaborators::TemplateGenerator;

/// One row per compartment, species and parameter, in declaration order.
///
/// Entities that already carry terms get one row per term so the template
/// reproduces them.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityTemplateGenerator;

impl TemplateGenerator for EntityTemplateGenerator {
    fn generate(&self, document: &ExchangeDocument) -> AnnotationTable {
        let mut records = Vec::new();
        for quantity in document.quantities() {
            let base = AnnotationRecord {
                element_id: quantity.id.to_string(),
                element_type: quantity.kind.to_string(),
                unit: quantity.unit.unwrap_or_default().to_string(),
                ..AnnotationRecord::default()
            };
            if quantity.annotations.is_empty() {
                records.push(base);
                continue;
            }
            for term in quantity.annotations {
                records.push(AnnotationRecord {
                    qualifier: term.qualifier.to_string(),
                    resource: term.resource.clone(),
                    ..base.clone()
                });
            }
        }
        AnnotationTable { records }
    }
}
