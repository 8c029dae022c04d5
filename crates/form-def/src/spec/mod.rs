pub mod field;
pub mod form;

pub use field::{Field, FieldType};
pub use form::{FormDefinition, Response};
