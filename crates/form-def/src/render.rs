use handlebars::Handlebars;
use serde_json::{Value, json};
use thiserror::Error;

use crate::registry::{Widget, widget};
use crate::spec::field::{Field, FieldType};
use crate::spec::form::FormDefinition;

/// Which of the two views a control is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// Authoring view: per-field action buttons, no submission names.
    Builder,
    /// Respondent view: named inputs, HTML required enforcement, no
    /// authoring controls.
    Fill,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template registration failed: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("render failed: {0}")]
    Render(#[from] handlebars::RenderError),
}

const BUILDER_PAGE: &str = "<div class=\"form-content\">\
{{#if empty}}<p class=\"empty-state\">Drag and drop fields here to start building your form</p>\
{{else}}{{#each fields}}{{> builder_field}}{{/each}}\
<button type=\"button\" class=\"generate-btn\" data-action=\"publish\">Generate Form</button>{{/if}}\
</div>";

const BUILDER_FIELD: &str = "<div class=\"form-field field-item\" data-field-id=\"{{id}}\">\
{{#if heading}}<input type=\"text\" class=\"heading-input\" value=\"{{label}}\" placeholder=\"Enter heading text\">\
{{else}}<label>{{label}}{{#if required}}<span class=\"required\">*</span>{{/if}}</label>{{{control}}}{{/if}}\
<div class=\"field-actions\">\
<button type=\"button\" class=\"action-btn settings-btn\" data-action=\"edit\" data-field-id=\"{{id}}\" title=\"Settings\">&#9881;</button>\
<button type=\"button\" class=\"action-btn copy-btn\" data-action=\"copy\" data-field-id=\"{{id}}\" title=\"Copy\">&#128203;</button>\
<button type=\"button\" class=\"action-btn delete-btn\" data-action=\"delete\" data-field-id=\"{{id}}\" title=\"Delete\">&#128465;</button>\
</div></div>";

const FILL_PAGE: &str = "<form class=\"fill-form\">\
<h1 class=\"form-title\">{{name}}</h1>\
{{#each fields}}{{> fill_field}}{{/each}}\
<button type=\"submit\" class=\"submit-btn\">Submit</button>\
</form>";

const FILL_FIELD: &str = "{{#if heading}}<h2 class=\"form-heading\">{{label}}</h2>\
{{else}}<div class=\"form-field\">\
<label for=\"field_{{id}}\">{{label}}{{#if required}}<span class=\"required\">*</span>{{/if}}</label>\
{{{control}}}</div>{{/if}}";

/// Pure markup producers for the builder and fill views. Both views take
/// the whole field sequence and replace the region's entire contents per
/// render; there is no incremental patching.
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut registry = Handlebars::new();
        registry.register_template_string("builder_page", BUILDER_PAGE)?;
        registry.register_template_string("builder_field", BUILDER_FIELD)?;
        registry.register_template_string("fill_page", FILL_PAGE)?;
        registry.register_template_string("fill_field", FILL_FIELD)?;
        Ok(Self { registry })
    }

    /// Editable builder view: every field with its action controls, then a
    /// single "Generate Form" action. An empty model renders the canvas
    /// placeholder instead.
    pub fn render_builder(&self, fields: &[Field]) -> Result<String, RenderError> {
        let ctx = json!({
            "empty": fields.is_empty(),
            "fields": fields
                .iter()
                .map(|field| field_context(field, RenderTarget::Builder))
                .collect::<Vec<_>>(),
        });
        Ok(self.registry.render("builder_page", &ctx)?)
    }

    /// Read-only submission view of a published definition.
    pub fn render_fill(&self, definition: &FormDefinition) -> Result<String, RenderError> {
        let ctx = json!({
            "name": definition.name,
            "fields": definition
                .fields
                .iter()
                .map(|field| field_context(field, RenderTarget::Fill))
                .collect::<Vec<_>>(),
        });
        Ok(self.registry.render("fill_page", &ctx)?)
    }
}

fn field_context(field: &Field, target: RenderTarget) -> Value {
    json!({
        "id": field.id,
        "label": field.label,
        "required": field.required,
        "heading": field.kind == FieldType::Heading,
        "control": control_markup(field, target),
    })
}

/// Control markup for a field, built from the widget registry. Labels are
/// escaped by the surrounding templates; the only dynamic text here is the
/// machine-generated field id and the fixed option strings.
fn control_markup(field: &Field, target: RenderTarget) -> String {
    let name_attrs = match target {
        RenderTarget::Builder => String::new(),
        RenderTarget::Fill => format!(" id=\"field_{id}\" name=\"field_{id}\"", id = field.id),
    };
    let required_attr = if target == RenderTarget::Fill && field.required {
        " required"
    } else {
        ""
    };

    match widget(field.kind) {
        Widget::Heading => String::new(),
        Widget::Text {
            html_type,
            placeholder,
        } => {
            let placeholder_attr = if placeholder.is_empty() {
                String::new()
            } else {
                format!(" placeholder=\"{placeholder}\"")
            };
            format!("<input type=\"{html_type}\"{name_attrs}{placeholder_attr}{required_attr}>")
        }
        Widget::TextArea { rows, placeholder } => format!(
            "<textarea{name_attrs} rows=\"{rows}\" placeholder=\"{placeholder}\"{required_attr}></textarea>"
        ),
        Widget::Select {
            placeholder,
            options,
        } => {
            let mut markup = format!("<select{name_attrs}{required_attr}>");
            markup.push_str(&format!("<option value=\"\">{placeholder}</option>"));
            for option in options {
                markup.push_str(&format!("<option value=\"{option}\">{option}</option>"));
            }
            markup.push_str("</select>");
            markup
        }
        Widget::RadioGroup { options } => {
            // In the fill view all radios share the field's submission name;
            // in the builder the group name is scoped by the field id.
            let group_name = match target {
                RenderTarget::Builder => format!("radio-{}", field.id),
                RenderTarget::Fill => format!("field_{}", field.id),
            };
            let mut markup = String::from("<div class=\"radio-group\">");
            for option in options {
                markup.push_str(&format!(
                    "<label class=\"radio-option\"><input type=\"radio\" name=\"{group_name}\" value=\"{option}\"{required_attr}><span>{option}</span></label>"
                ));
            }
            markup.push_str("</div>");
            markup
        }
    }
}
