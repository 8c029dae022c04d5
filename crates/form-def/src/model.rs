use crate::spec::field::{Field, FieldType};

/// Label and required flag collected when a field is created.
#[derive(Debug, Clone, Default)]
pub struct FieldDraft {
    pub label: String,
    pub required: bool,
}

/// Interactive collaborator for field authoring. The UI surface (console,
/// component host, test script) answers create and delete requests;
/// returning `None` or `false` abandons the operation and leaves the model
/// untouched.
pub trait FieldEditor {
    /// Collect a label (and, for non-heading kinds, a required flag) for a
    /// field about to be created.
    fn draft_field(&mut self, kind: FieldType) -> Option<FieldDraft>;

    /// Confirm removal of an existing field.
    fn confirm_delete(&mut self, field: &Field) -> bool;
}

/// Editor that answers a single create request with a prepared draft and
/// confirms every delete. Used by non-interactive callers that already
/// collected the inputs.
pub struct PreparedEditor {
    draft: Option<FieldDraft>,
}

impl PreparedEditor {
    pub fn new(label: impl Into<String>, required: bool) -> Self {
        Self {
            draft: Some(FieldDraft {
                label: label.into(),
                required,
            }),
        }
    }
}

impl FieldEditor for PreparedEditor {
    fn draft_field(&mut self, _kind: FieldType) -> Option<FieldDraft> {
        self.draft.take()
    }

    fn confirm_delete(&mut self, _field: &Field) -> bool {
        true
    }
}

/// Live, editable ordered collection of fields during authoring.
///
/// Ids are `<type>-<counter>`; the counter only moves forward, so an id is
/// never reused within the model's lifetime even after deletions.
#[derive(Debug, Default)]
pub struct FieldModel {
    fields: Vec<Field>,
    counter: u64,
}

impl FieldModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a model from an existing field sequence. The counter resumes
    /// past the highest numeric id suffix so fresh ids stay collision-free.
    pub fn from_fields(fields: Vec<Field>) -> Self {
        let counter = fields
            .iter()
            .filter_map(|field| field.id.rsplit('-').next())
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self { fields, counter }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.id == id)
    }

    /// Value snapshot of the current sequence, as handed to the publish
    /// gateway. Later edits to the model do not touch the snapshot.
    pub fn snapshot(&self) -> Vec<Field> {
        self.fields.clone()
    }

    fn next_id(&mut self, kind: FieldType) -> String {
        self.counter += 1;
        format!("{}-{}", kind.as_str(), self.counter)
    }

    /// Create a field of the given kind, collecting its label and required
    /// flag through the editor, and append it to the sequence.
    ///
    /// The add is abandoned when the editor declines or when a non-heading
    /// draft comes back with an empty label; headings may be empty since the
    /// label is the heading text itself.
    pub fn add_field(&mut self, kind: FieldType, editor: &mut dyn FieldEditor) -> Option<&Field> {
        let draft = editor.draft_field(kind)?;
        if kind != FieldType::Heading && draft.label.trim().is_empty() {
            return None;
        }
        let id = self.next_id(kind);
        self.fields.push(Field {
            id,
            kind,
            label: draft.label,
            required: kind != FieldType::Heading && draft.required,
        });
        self.fields.last()
    }

    /// Remove the field with the given id after editor confirmation.
    ///
    /// Deleting a stale id is a no-op, not an error; returns whether the
    /// sequence changed.
    pub fn delete_field(&mut self, id: &str, editor: &mut dyn FieldEditor) -> bool {
        let Some(position) = self.fields.iter().position(|field| field.id == id) else {
            return false;
        };
        if !editor.confirm_delete(&self.fields[position]) {
            return false;
        }
        self.fields.remove(position);
        true
    }

    /// Replace a field's label in place, preserving its required marker.
    /// An empty replacement abandons the edit rather than clearing the label.
    pub fn edit_label(&mut self, id: &str, new_label: &str) -> bool {
        if new_label.trim().is_empty() {
            return false;
        }
        if let Some(field) = self.fields.iter_mut().find(|field| field.id == id) {
            field.label = new_label.to_string();
            true
        } else {
            false
        }
    }

    /// Structural copy of an existing field under a fresh id derived from
    /// the original's type, inserted immediately after the original.
    pub fn duplicate_field(&mut self, id: &str) -> Option<&Field> {
        let position = self.fields.iter().position(|field| field.id == id)?;
        let mut copy = self.fields[position].clone();
        copy.id = self.next_id(copy.kind);
        self.fields.insert(position + 1, copy);
        self.fields.get(position + 1)
    }
}
