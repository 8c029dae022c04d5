use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::spec::field::Field;
use crate::spec::form::{FormDefinition, Response};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no form stored under '{0}'")]
    NotFound(String),
    #[error("form has no fields; add at least one before publishing")]
    EmptyForm,
    #[error("stored entry '{key}' is not a valid form record: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
    #[error("form '{0}' changed while recording the response; retry the submission")]
    VersionConflict(String),
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Minimal key-value surface the gateway persists through, so in-memory,
/// file-backed, and host-provided stores are interchangeable.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store; also round-trips as a single JSON object so a host can
/// carry the whole storage blob across stateless calls.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: &Value) -> Self {
        let entries = value
            .as_object()
            .map(|object| {
                object
                    .iter()
                    .filter_map(|(key, value)| {
                        value.as_str().map(|text| (key.clone(), text.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { entries }
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        for (key, value) in &self.entries {
            object.insert(key.clone(), Value::String(value.clone()));
        }
        Value::Object(object)
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per form under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

fn sanitize_key(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() { "form".into() } else { cleaned }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// On-disk record shape: the definition plus an optimistic version counter.
/// `version` defaults to zero so records written before it existed still
/// resolve.
#[derive(Debug, Serialize, Deserialize)]
struct StoredForm {
    #[serde(default)]
    version: u64,
    #[serde(flatten)]
    form: FormDefinition,
}

/// A freshly published form: the generated id and the shareable link.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedForm {
    pub form_id: String,
    pub link: String,
}

/// Serializes form definitions into the backing store and appends
/// submitted responses to them.
pub struct FormGateway<S: KvStore> {
    store: S,
}

impl<S: KvStore> FormGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Snapshot the field sequence into a new definition stored under a
    /// fresh id, and build the shareable link `<base>?form=<id>`.
    ///
    /// Publishing zero fields fails with `EmptyForm` before anything is
    /// written.
    pub fn publish(
        &mut self,
        name: &str,
        fields: &[Field],
        base: &str,
    ) -> Result<PublishedForm, StoreError> {
        if fields.is_empty() {
            return Err(StoreError::EmptyForm);
        }
        let form_id = self.generate_form_id()?;
        let record = StoredForm {
            version: 0,
            form: FormDefinition::new(name, fields.to_vec()),
        };
        self.store_record(&form_id, &record)?;
        let link = crate::dispatch::share_link(base, &form_id);
        Ok(PublishedForm { form_id, link })
    }

    /// Look up and deserialize the stored definition.
    pub fn resolve(&self, form_id: &str) -> Result<FormDefinition, StoreError> {
        self.load_record(form_id).map(|record| record.form)
    }

    /// Append one response to the stored definition (read-modify-write).
    ///
    /// The version counter is bumped on every write and re-checked just
    /// before storing; a concurrent writer that lands in between surfaces
    /// as `VersionConflict` instead of silently dropping a response.
    pub fn record_response(&mut self, form_id: &str, response: Response) -> Result<(), StoreError> {
        let mut record = self.load_record(form_id)?;
        let expected = record.version;
        record.form.responses.push(response);
        record.version += 1;

        let current = self.load_record(form_id)?;
        if current.version != expected {
            return Err(StoreError::VersionConflict(form_id.to_string()));
        }
        self.store_record(form_id, &record)
    }

    /// Timestamp-derived id, probed against the store so a same-millisecond
    /// publish never collides with an existing key.
    fn generate_form_id(&self) -> Result<String, StoreError> {
        let stamp = Utc::now().timestamp_millis();
        let mut seq = 0u32;
        loop {
            let candidate = if seq == 0 {
                format!("form-{stamp}")
            } else {
                format!("form-{stamp}-{seq}")
            };
            if self.store.get(&candidate)?.is_none() {
                return Ok(candidate);
            }
            seq += 1;
        }
    }

    fn load_record(&self, form_id: &str) -> Result<StoredForm, StoreError> {
        let raw = self
            .store
            .get(form_id)?
            .ok_or_else(|| StoreError::NotFound(form_id.to_string()))?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            key: form_id.to_string(),
            source,
        })
    }

    fn store_record(&mut self, form_id: &str, record: &StoredForm) -> Result<(), StoreError> {
        let raw = serde_json::to_string(record).map_err(StoreError::Encode)?;
        self.store.put(form_id, &raw)
    }
}
