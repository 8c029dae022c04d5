use crate::spec::field::{Field, FieldType};

/// Fixed option labels for choice widgets.
pub const DROPDOWN_OPTIONS: [&str; 3] = ["Option 1", "Option 2", "Option 3"];
pub const RADIO_OPTIONS: [&str; 2] = ["Option 1", "Option 2"];

/// Rendering description for a field kind, consumed by both the builder
/// and fill renderers so the type dispatch lives in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    /// Section heading; the field label is the heading text.
    Heading,
    /// Single-line input with an HTML input type and placeholder.
    Text {
        html_type: &'static str,
        placeholder: &'static str,
    },
    /// Multi-line input.
    TextArea {
        rows: u8,
        placeholder: &'static str,
    },
    /// Select with a non-submitting placeholder option plus fixed options.
    Select {
        placeholder: &'static str,
        options: &'static [&'static str],
    },
    /// Radio group; the grouping name is scoped by the field id (which
    /// embeds the type) so groups never interfere across fields.
    RadioGroup { options: &'static [&'static str] },
}

pub fn widget(kind: FieldType) -> Widget {
    match kind {
        FieldType::Heading => Widget::Heading,
        FieldType::Name => Widget::Text {
            html_type: "text",
            placeholder: "Enter full name",
        },
        FieldType::Address => Widget::TextArea {
            rows: 3,
            placeholder: "Enter address",
        },
        FieldType::Email => Widget::Text {
            html_type: "email",
            placeholder: "email@example.com",
        },
        FieldType::Phone => Widget::Text {
            html_type: "tel",
            placeholder: "+1 (555) 000-0000",
        },
        FieldType::DateOfBirth => Widget::Text {
            html_type: "date",
            placeholder: "",
        },
        FieldType::Dropdown => Widget::Select {
            placeholder: "Choose an option",
            options: &DROPDOWN_OPTIONS,
        },
        FieldType::Radio => Widget::RadioGroup {
            options: &RADIO_OPTIONS,
        },
    }
}

/// Suggested label offered when authoring a field of this kind.
pub fn default_label(kind: FieldType) -> &'static str {
    match kind {
        FieldType::Heading => "Heading",
        FieldType::Name => "Full Name",
        FieldType::Address => "Address",
        FieldType::Email => "Email Address",
        FieldType::Phone => "Phone Number",
        FieldType::DateOfBirth => "Date of Birth",
        FieldType::Dropdown => "Select Option",
        FieldType::Radio => "Choose One",
    }
}

/// Whether fields of this kind collect a value in fill mode.
pub fn is_data_bearing(kind: FieldType) -> bool {
    kind != FieldType::Heading
}

/// Map a raw submitted value onto the field's contribution to a response.
/// Unanswered choice widgets contribute nothing rather than an empty entry.
pub fn extract_response_value(field: &Field, raw: Option<&str>) -> Option<String> {
    if !is_data_bearing(field.kind) {
        return None;
    }
    let raw = raw?;
    match widget(field.kind) {
        Widget::RadioGroup { .. } | Widget::Select { .. } if raw.is_empty() => None,
        _ => Some(raw.to_string()),
    }
}
