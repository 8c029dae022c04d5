use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field kinds a form can carry. Upload/signature/rating widgets from the
/// palette are purely cosmetic and hold no data, so they are not part of
/// the definition model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Heading,
    Name,
    Address,
    Email,
    Phone,
    #[serde(rename = "dob")]
    DateOfBirth,
    Dropdown,
    Radio,
}

impl FieldType {
    pub const ALL: [FieldType; 8] = [
        FieldType::Heading,
        FieldType::Name,
        FieldType::Address,
        FieldType::Email,
        FieldType::Phone,
        FieldType::DateOfBirth,
        FieldType::Dropdown,
        FieldType::Radio,
    ];

    /// Wire name used in serialized definitions and as the id prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Heading => "heading",
            FieldType::Name => "name",
            FieldType::Address => "address",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::DateOfBirth => "dob",
            FieldType::Dropdown => "dropdown",
            FieldType::Radio => "radio",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "heading" => Ok(FieldType::Heading),
            "name" => Ok(FieldType::Name),
            "address" => Ok(FieldType::Address),
            "email" => Ok(FieldType::Email),
            "phone" | "tel" => Ok(FieldType::Phone),
            "dob" | "date-of-birth" => Ok(FieldType::DateOfBirth),
            "dropdown" | "select" => Ok(FieldType::Dropdown),
            "radio" => Ok(FieldType::Radio),
            _ => Err(format!("unknown field type '{}'", value)),
        }
    }
}

/// One logical input (or heading) unit of a form definition.
///
/// `id` is assigned once at creation and never changes or gets reused;
/// the order of the containing sequence is the display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Field {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
}

impl Field {
    /// Key this field contributes to a submitted response.
    pub fn response_key(&self) -> String {
        format!("field_{}", self.id)
    }
}
