#![allow(missing_docs)]

pub mod dispatch;
pub mod model;
pub mod registry;
pub mod render;
pub mod schema;
pub mod spec;
pub mod store;
pub mod validate;

pub use dispatch::{Mode, dispatch, share_link};
pub use model::{FieldDraft, FieldEditor, FieldModel, PreparedEditor};
pub use registry::{Widget, default_label, extract_response_value, is_data_bearing, widget};
pub use render::{RenderError, RenderTarget, Renderer};
pub use schema::response_schema;
pub use spec::{Field, FieldType, FormDefinition, Response};
pub use store::{FileStore, FormGateway, KvStore, MemoryStore, PublishedForm, StoreError};
pub use validate::{ValidationError, ValidationResult, validate_response};
