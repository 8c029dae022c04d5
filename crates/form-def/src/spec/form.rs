use chrono::{Local, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::spec::field::Field;

/// One respondent's submitted answers: `field_<id>` keys mapped to raw
/// string values, stamped at construction time. Radio fields contribute
/// at most one selected option or are absent entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Response {
    #[serde(flatten)]
    pub values: BTreeMap<String, String>,
    pub timestamp: String,
    #[serde(rename = "submittedAt")]
    pub submitted_at: String,
}

impl Response {
    /// Stamp a response with the current time.
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self::with_timestamps(
            values,
            Utc::now().to_rfc3339(),
            Local::now().format("%b %e, %Y %H:%M:%S").to_string(),
        )
    }

    /// Construction with explicit stamps, for deterministic tests.
    pub fn with_timestamps(
        values: BTreeMap<String, String>,
        timestamp: String,
        submitted_at: String,
    ) -> Self {
        Self {
            values,
            timestamp,
            submitted_at,
        }
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }
}

/// Published snapshot of a form plus its accumulating responses.
///
/// Stored under a generated `formId` key; `fields` is a value snapshot of
/// the authoring model at publish time and `responses` only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormDefinition {
    pub name: String,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub responses: Vec<Response>,
}

impl FormDefinition {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
            responses: Vec::new(),
        }
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.id == id)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
