use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::registry::{Widget, is_data_bearing, widget};
use crate::spec::field::Field;
use crate::spec::form::FormDefinition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub missing_required: Vec<String>,
    pub unknown_fields: Vec<String>,
}

/// Check a submission against what the fill view's markup would enforce:
/// required inputs filled, keys belonging to known fields, choice values
/// drawn from the fixed option set. Content beyond that is not validated.
pub fn validate_response(
    definition: &FormDefinition,
    values: &BTreeMap<String, String>,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut missing_required = Vec::new();

    for field in &definition.fields {
        if !is_data_bearing(field.kind) {
            continue;
        }
        let key = field.response_key();
        match values.get(&key) {
            None => {
                if field.required {
                    missing_required.push(key);
                }
            }
            Some(value) if value.trim().is_empty() => {
                if field.required {
                    missing_required.push(key);
                }
            }
            Some(value) => {
                if let Some(error) = validate_choice(field, value) {
                    errors.push(error);
                }
            }
        }
    }

    let known_keys: std::collections::BTreeSet<String> = definition
        .fields
        .iter()
        .filter(|field| is_data_bearing(field.kind))
        .map(|field| field.response_key())
        .collect();
    let unknown_fields: Vec<String> = values
        .keys()
        .filter(|key| !known_keys.contains(*key))
        .cloned()
        .collect();

    ValidationResult {
        valid: errors.is_empty() && missing_required.is_empty() && unknown_fields.is_empty(),
        errors,
        missing_required,
        unknown_fields,
    }
}

fn validate_choice(field: &Field, value: &str) -> Option<ValidationError> {
    let options: &[&str] = match widget(field.kind) {
        Widget::Select { options, .. } => options,
        Widget::RadioGroup { options } => options,
        _ => return None,
    };
    if options.contains(&value) {
        None
    } else {
        Some(ValidationError {
            field_id: Some(field.id.clone()),
            message: format!("value must be one of: {}", options.join(", ")),
            code: Some("option_mismatch".into()),
        })
    }
}
