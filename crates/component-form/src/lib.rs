//! String-in/string-out facade over the form builder core.
//!
//! Every operation takes and returns JSON strings so a host UI (the drag
//! and drop palette, a page bootstrap, a test harness) can call the core
//! without linking against its types. The durable store travels as a
//! single JSON object (`storage_json`), mirroring a per-origin key-value
//! store: callers pass the current blob in and persist the blob that
//! comes back.

use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use thiserror::Error;

use form_def::{
    Field, FieldModel, FieldType, FormGateway, MemoryStore, PreparedEditor, Renderer, Response,
    StoreError, response_schema, validate_response,
};

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse {0} payload: {1}")]
    Parse(&'static str, #[source] serde_json::Error),
    #[error("unknown field type: {0}")]
    FieldType(String),
    #[error("no field with id '{0}'")]
    FieldUnavailable(String),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] form_def::RenderError),
}

fn parse_fields(fields_json: &str) -> Result<Vec<Field>, ComponentError> {
    if fields_json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(fields_json).map_err(|err| ComponentError::Parse("fields", err))
}

fn parse_storage(storage_json: &str) -> MemoryStore {
    let value: Value =
        serde_json::from_str(storage_json).unwrap_or_else(|_| Value::Object(Map::new()));
    MemoryStore::from_value(&value)
}

fn parse_values(values_json: &str) -> Result<BTreeMap<String, String>, ComponentError> {
    if values_json.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(values_json).map_err(|err| ComponentError::Parse("values", err))
}

fn fields_payload(model: &FieldModel) -> Result<Value, ComponentError> {
    serde_json::to_value(model.fields()).map_err(ComponentError::JsonEncode)
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

/// Append a field of the given kind. The host has already collected the
/// label and required flag through its own dialog; an empty label on a
/// non-heading kind leaves the sequence unchanged, matching an abandoned
/// prompt.
pub fn add_field(fields_json: &str, kind: &str, label: &str, required: bool) -> String {
    respond((|| {
        let kind: FieldType = kind
            .parse()
            .map_err(|_| ComponentError::FieldType(kind.to_string()))?;
        let mut model = FieldModel::from_fields(parse_fields(fields_json)?);
        let mut editor = PreparedEditor::new(label, required);
        model.add_field(kind, &mut editor);
        fields_payload(&model)
    })())
}

/// Remove a field by id. Stale ids are a no-op, so repeated clicks on a
/// delete control cannot fail.
pub fn delete_field(fields_json: &str, field_id: &str) -> String {
    respond((|| {
        let mut model = FieldModel::from_fields(parse_fields(fields_json)?);
        let mut editor = PreparedEditor::new("", false);
        model.delete_field(field_id, &mut editor);
        fields_payload(&model)
    })())
}

/// Replace a field's label; an empty replacement keeps the current label.
pub fn edit_label(fields_json: &str, field_id: &str, new_label: &str) -> String {
    respond((|| {
        let mut model = FieldModel::from_fields(parse_fields(fields_json)?);
        if model.field(field_id).is_none() {
            return Err(ComponentError::FieldUnavailable(field_id.to_string()));
        }
        model.edit_label(field_id, new_label);
        fields_payload(&model)
    })())
}

/// Copy a field under a fresh id, inserted right after the original.
pub fn duplicate_field(fields_json: &str, field_id: &str) -> String {
    respond((|| {
        let mut model = FieldModel::from_fields(parse_fields(fields_json)?);
        if model.duplicate_field(field_id).is_none() {
            return Err(ComponentError::FieldUnavailable(field_id.to_string()));
        }
        fields_payload(&model)
    })())
}

/// Builder-mode markup for the current field sequence.
pub fn render_builder_html(fields_json: &str) -> String {
    respond_string((|| {
        let fields = parse_fields(fields_json)?;
        let renderer = Renderer::new()?;
        Ok(renderer.render_builder(&fields)?)
    })())
}

/// Fill-mode markup for a published form.
pub fn render_fill_html(form_id: &str, storage_json: &str) -> String {
    respond_string((|| {
        let gateway = FormGateway::new(parse_storage(storage_json));
        let definition = gateway.resolve(form_id)?;
        let renderer = Renderer::new()?;
        Ok(renderer.render_fill(&definition)?)
    })())
}

/// Publish the current field sequence under a generated id and return the
/// shareable link together with the updated storage blob.
pub fn publish(fields_json: &str, name: &str, base: &str, storage_json: &str) -> String {
    respond((|| {
        let fields = parse_fields(fields_json)?;
        let mut gateway = FormGateway::new(parse_storage(storage_json));
        let published = gateway.publish(name, &fields, base)?;
        Ok(json!({
            "form_id": published.form_id,
            "link": published.link,
            "storage": gateway.into_store().to_value(),
        }))
    })())
}

/// Look up a published definition; `{"error": ...}` when the id is not in
/// the storage blob.
pub fn resolve(form_id: &str, storage_json: &str) -> String {
    respond((|| {
        let gateway = FormGateway::new(parse_storage(storage_json));
        let definition = gateway.resolve(form_id)?;
        serde_json::to_value(definition).map_err(ComponentError::JsonEncode)
    })())
}

/// Validate and record one submission against a published form. A failed
/// validation returns the result without touching storage.
pub fn submit_response(form_id: &str, values_json: &str, storage_json: &str) -> String {
    respond((|| {
        let mut gateway = FormGateway::new(parse_storage(storage_json));
        let definition = gateway.resolve(form_id)?;
        let values = parse_values(values_json)?;

        let validation = validate_response(&definition, &values);
        if !validation.valid {
            let validation_value =
                serde_json::to_value(&validation).map_err(ComponentError::JsonEncode)?;
            return Ok(json!({
                "status": "error",
                "validation": validation_value,
            }));
        }

        gateway.record_response(form_id, Response::new(values))?;
        let response_count = gateway.resolve(form_id)?.responses.len();
        Ok(json!({
            "status": "recorded",
            "response_count": response_count,
            "storage": gateway.into_store().to_value(),
        }))
    })())
}

/// JSON Schema for one response to a published form.
pub fn response_schema_for(form_id: &str, storage_json: &str) -> String {
    respond((|| {
        let gateway = FormGateway::new(parse_storage(storage_json));
        let definition = gateway.resolve(form_id)?;
        Ok(response_schema(&definition))
    })())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_storage() -> (String, String) {
        let fields = add_field("[]", "name", "Full Name", true);
        let fields = add_field(&fields, "email", "Email", false);
        let published = publish(&fields, "Contact", "https://example.test/builder", "{}");
        let parsed: Value = serde_json::from_str(&published).expect("json");
        let form_id = parsed["form_id"].as_str().expect("form_id").to_string();
        let storage = parsed["storage"].to_string();
        (form_id, storage)
    }

    #[test]
    fn add_field_appends_with_generated_id() {
        let fields = add_field("[]", "name", "Full Name", true);
        let parsed: Value = serde_json::from_str(&fields).expect("json");
        assert_eq!(parsed[0]["id"], "name-1");
        assert_eq!(parsed[0]["type"], "name");
        assert_eq!(parsed[0]["required"], true);
    }

    #[test]
    fn add_field_with_empty_label_is_abandoned() {
        let fields = add_field("[]", "email", "", true);
        let parsed: Value = serde_json::from_str(&fields).expect("json");
        assert_eq!(parsed.as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn add_field_rejects_unknown_types() {
        let response = add_field("[]", "carousel", "X", false);
        let parsed: Value = serde_json::from_str(&response).expect("json");
        assert!(
            parsed["error"]
                .as_str()
                .expect("error")
                .contains("unknown field type")
        );
    }

    #[test]
    fn duplicate_inserts_after_source_with_new_id() {
        let fields = add_field("[]", "name", "Full Name", true);
        let fields = add_field(&fields, "email", "Email", false);
        let fields = duplicate_field(&fields, "name-1");
        let parsed: Value = serde_json::from_str(&fields).expect("json");
        assert_eq!(parsed[1]["id"], "name-3");
        assert_eq!(parsed[1]["label"], "Full Name");
        assert_eq!(parsed[2]["id"], "email-2");
    }

    #[test]
    fn delete_is_idempotent_against_stale_ids() {
        let fields = add_field("[]", "name", "Full Name", true);
        let once = delete_field(&fields, "name-1");
        let twice = delete_field(&once, "name-1");
        let parsed: Value = serde_json::from_str(&twice).expect("json");
        assert_eq!(parsed.as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn render_builder_html_shows_empty_state_for_no_fields() {
        let html = render_builder_html("[]");
        assert!(html.contains("empty-state"));
    }

    #[test]
    fn publish_returns_link_and_storage() {
        let (form_id, storage) = seeded_storage();
        assert!(form_id.starts_with("form-"));
        let storage_value: Value = serde_json::from_str(&storage).expect("json");
        assert!(storage_value.get(&form_id).is_some());
    }

    #[test]
    fn publish_of_empty_fields_reports_the_error() {
        let response = publish("[]", "Contact", "https://example.test", "{}");
        let parsed: Value = serde_json::from_str(&response).expect("json");
        assert!(
            parsed["error"]
                .as_str()
                .expect("error")
                .contains("no fields")
        );
    }

    #[test]
    fn resolve_unknown_id_reports_not_found() {
        let response = resolve("nonexistent-id", "{}");
        let parsed: Value = serde_json::from_str(&response).expect("json");
        assert!(
            parsed["error"]
                .as_str()
                .expect("error")
                .contains("nonexistent-id")
        );
    }

    #[test]
    fn render_fill_html_names_inputs_for_submission() {
        let (form_id, storage) = seeded_storage();
        let html = render_fill_html(&form_id, &storage);
        assert!(html.contains("name=\"field_name-1\""));
        assert!(html.contains("Submit"));
    }

    #[test]
    fn submit_response_records_and_grows_storage() {
        let (form_id, storage) = seeded_storage();
        let values = json!({ "field_name-1": "Jane Doe", "field_email-2": "" }).to_string();
        let response = submit_response(&form_id, &values, &storage);
        let parsed: Value = serde_json::from_str(&response).expect("json");
        assert_eq!(parsed["status"], "recorded");
        assert_eq!(parsed["response_count"], 1);

        let updated_storage = parsed["storage"].to_string();
        let resolved = resolve(&form_id, &updated_storage);
        let definition: Value = serde_json::from_str(&resolved).expect("json");
        assert_eq!(definition["responses"][0]["field_name-1"], "Jane Doe");
        assert!(definition["responses"][0]["timestamp"].is_string());
    }

    #[test]
    fn submit_response_surfaces_missing_required() {
        let (form_id, storage) = seeded_storage();
        let values = json!({ "field_email-2": "jane@example.test" }).to_string();
        let response = submit_response(&form_id, &values, &storage);
        let parsed: Value = serde_json::from_str(&response).expect("json");
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["validation"]["missing_required"][0], "field_name-1");
    }

    #[test]
    fn response_schema_lists_required_keys() {
        let (form_id, storage) = seeded_storage();
        let schema = response_schema_for(&form_id, &storage);
        let parsed: Value = serde_json::from_str(&schema).expect("json");
        assert!(
            parsed["properties"]
                .as_object()
                .expect("properties")
                .contains_key("field_name-1")
        );
        let required = parsed["required"].as_array().expect("required");
        assert!(required.iter().any(|key| key == "field_name-1"));
        assert!(required.iter().any(|key| key == "timestamp"));
    }
}
