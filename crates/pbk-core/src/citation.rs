//! Citation metadata read from a Citation File Format (`CITATION.cff`) record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "given-names", default, skip_serializing_if = "Option::is_none")]
    pub given_names: Option<String>,
    #[serde(rename = "family-names", default, skip_serializing_if = "Option::is_none")]
    pub family_names: Option<String>,
    /// Entity authors (organisations) use `name` instead of person names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Author {
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.given_names, &self.family_names, &self.name) {
            (Some(given), Some(family), _) => format!("{given} {family}"),
            (None, Some(family), _) => family.clone(),
            (_, _, Some(name)) => name.clone(),
            (Some(given), None, None) => given.clone(),
            (None, None, None) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(rename = "cff-version", default, skip_serializing_if = "Option::is_none")]
    pub cff_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(rename = "date-released", default, skip_serializing_if = "Option::is_none")]
    pub date_released: Option<String>,
    #[serde(rename = "repository-code", default, skip_serializing_if = "Option::is_none")]
    pub repository_code: Option<String>,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl Citation {
    /// Decode a `CITATION.cff` document. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Citation` when the YAML cannot be decoded.
    pub fn from_cff_str(content: &str) -> Result<Self, CoreError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Required fields that are empty, by CFF key.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.authors.iter().all(|a| a.display_name().trim().is_empty()) {
            missing.push("authors");
        }
        missing
    }

    #[must_use]
    pub fn released_on(&self) -> Option<NaiveDate> {
        self.date_released
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
    }
}
