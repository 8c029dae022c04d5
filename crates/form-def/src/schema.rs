use serde_json::{Map, Value, json};

use crate::registry::is_data_bearing;
use crate::spec::form::FormDefinition;

/// JSON Schema describing one response to a published form: a string
/// property per data-bearing field (titled by its label) plus the two
/// submission stamps. Required field keys and both stamps are listed as
/// required; extra keys are rejected.
pub fn response_schema(definition: &FormDefinition) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in &definition.fields {
        if !is_data_bearing(field.kind) {
            continue;
        }
        let key = field.response_key();
        properties.insert(
            key.clone(),
            json!({
                "type": "string",
                "title": field.label,
            }),
        );
        if field.required {
            required.push(Value::String(key));
        }
    }

    properties.insert("timestamp".into(), json!({ "type": "string" }));
    properties.insert("submittedAt".into(), json!({ "type": "string" }));
    required.push(Value::String("timestamp".into()));
    required.push(Value::String("submittedAt".into()));

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": format!("{} response", definition.name),
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}
