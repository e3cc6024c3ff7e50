//! Ontology annotations: qualifiers, terms attached to document entities, and
//! the human-editable annotation table (`{name}.annotations.csv`).

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::csv::{CsvTable, write_record};
use crate::errors::CoreError;

/// Column headers of the annotation table, in file order.
pub const ANNOTATION_COLUMNS: [&str; 6] = [
    "element_id",
    "element_type",
    "unit",
    "qualifier",
    "resource",
    "description",
];

/// BioModels qualifiers relating an entity to an ontology resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Qualifier {
    #[serde(rename = "bqbiol:is")]
    BiolIs,
    #[serde(rename = "bqbiol:isVersionOf")]
    BiolIsVersionOf,
    #[serde(rename = "bqbiol:hasVersion")]
    BiolHasVersion,
    #[serde(rename = "bqbiol:hasPart")]
    BiolHasPart,
    #[serde(rename = "bqbiol:isPartOf")]
    BiolIsPartOf,
    #[serde(rename = "bqbiol:hasProperty")]
    BiolHasProperty,
    #[serde(rename = "bqbiol:isDescribedBy")]
    BiolIsDescribedBy,
    #[serde(rename = "bqmodel:is")]
    ModelIs,
    #[serde(rename = "bqmodel:isDescribedBy")]
    ModelIsDescribedBy,
    #[serde(rename = "bqmodel:isDerivedFrom")]
    ModelIsDerivedFrom,
}

impl Qualifier {
    pub const ALL: [Self; 10] = [
        Self::BiolIs,
        Self::BiolIsVersionOf,
        Self::BiolHasVersion,
        Self::BiolHasPart,
        Self::BiolIsPartOf,
        Self::BiolHasProperty,
        Self::BiolIsDescribedBy,
        Self::ModelIs,
        Self::ModelIsDescribedBy,
        Self::ModelIsDerivedFrom,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BiolIs => "bqbiol:is",
            Self::BiolIsVersionOf => "bqbiol:isVersionOf",
            Self::BiolHasVersion => "bqbiol:hasVersion",
            Self::BiolHasPart => "bqbiol:hasPart",
            Self::BiolIsPartOf => "bqbiol:isPartOf",
            Self::BiolHasProperty => "bqbiol:hasProperty",
            Self::BiolIsDescribedBy => "bqbiol:isDescribedBy",
            Self::ModelIs => "bqmodel:is",
            Self::ModelIsDescribedBy => "bqmodel:isDescribedBy",
            Self::ModelIsDerivedFrom => "bqmodel:isDerivedFrom",
        }
    }

    /// libSBML-style constant name, e.g. `BQB_HAS_PROPERTY`.
    #[must_use]
    pub const fn constant_name(self) -> &'static str {
        match self {
            Self::BiolIs => "BQB_IS",
            Self::BiolIsVersionOf => "BQB_IS_VERSION_OF",
            Self::BiolHasVersion => "BQB_HAS_VERSION",
            Self::BiolHasPart => "BQB_HAS_PART",
            Self::BiolIsPartOf => "BQB_IS_PART_OF",
            Self::BiolHasProperty => "BQB_HAS_PROPERTY",
            Self::BiolIsDescribedBy => "BQB_IS_DESCRIBED_BY",
            Self::ModelIs => "BQM_IS",
            Self::ModelIsDescribedBy => "BQM_IS_DESCRIBED_BY",
            Self::ModelIsDerivedFrom => "BQM_IS_DERIVED_FROM",
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Qualifier {
    type Err = String;

    /// Accepts both `bqbiol:hasProperty` and `BQB_HAS_PROPERTY` spellings,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|q| {
                q.as_str().eq_ignore_ascii_case(wanted)
                    || q.constant_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| format!("unknown qualifier '{wanted}'"))
    }
}

/// One ontology reference attached to a document entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyTerm {
    pub qualifier: Qualifier,
    pub resource: String,
}

/// One row of the annotation table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub element_id: String,
    pub element_type: String,
    pub unit: String,
    pub qualifier: String,
    pub resource: String,
    pub description: String,
    /// 1-based line in the source file, zero for generated rows.
    #[serde(skip)]
    pub line: usize,
}

impl AnnotationRecord {
    /// A row that still carries no ontology reference.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.resource.trim().is_empty()
    }
}

/// Entity identifier → annotation rows, kept in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationTable {
    pub records: Vec<AnnotationRecord>,
}

impl AnnotationTable {
    /// Parse an annotation table.
    ///
    /// Only `element_id` is mandatory; missing optional columns read as empty.
    ///
    /// # Errors
    ///
    /// Returns a `CoreError` for malformed CSV or a missing `element_id` column.
    pub fn from_csv(content: &str) -> Result<Self, CoreError> {
        let table = CsvTable::parse(content)?;
        let id_col = table.require_column("element_id")?;
        let col = |name: &str| table.column(name);
        let (type_col, unit_col, qualifier_col, resource_col, description_col) = (
            col("element_type"),
            col("unit"),
            col("qualifier"),
            col("resource"),
            col("description"),
        );
        let field = |record: &crate::csv::CsvRecord, index: Option<usize>| {
            index.map_or_else(String::new, |i| record.get(i).trim().to_string())
        };

        let records = table
            .records
            .iter()
            .map(|record| AnnotationRecord {
                element_id: record.get(id_col).trim().to_string(),
                element_type: field(record, type_col),
                unit: field(record, unit_col),
                qualifier: field(record, qualifier_col),
                resource: field(record, resource_col),
                description: field(record, description_col),
                line: record.line,
            })
            .collect();
        Ok(Self { records })
    }

    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        write_record(&mut out, &ANNOTATION_COLUMNS);
        for record in &self.records {
            write_record(
                &mut out,
                &[
                    &record.element_id,
                    &record.element_type,
                    &record.unit,
                    &record.qualifier,
                    &record.resource,
                    &record.description,
                ],
            );
        }
        out
    }

    /// Rows grouped by entity identifier, in first-appearance order.
    #[must_use]
    pub fn by_element(&self) -> IndexMap<&str, Vec<&AnnotationRecord>> {
        let mut grouped: IndexMap<&str, Vec<&AnnotationRecord>> = IndexMap::new();
        for record in &self.records {
            grouped
                .entry(record.element_id.as_str())
                .or_default()
                .push(record);
        }
        grouped
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
