//! Gesture store: durable, ordered collection of gesture bindings.
//!
//! Names are unique within a store. Appending a binding whose name already
//! exists removes the old record and appends the new one at the end, so a
//! re-recorded gesture behaves like delete followed by create.

use crate::{binding::GestureBinding, Error, Result};
use log::{debug, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Persistence collaborator consulted by the detection loop
pub trait GestureStore: Send {
    /// Load every binding in insertion order
    fn load_all(&self) -> Result<Vec<GestureBinding>>;

    /// Persist a binding, replacing any binding with the same name
    fn append(&mut self, binding: GestureBinding) -> Result<()>;

    /// Remove the binding called `name`; returns whether one was removed
    fn delete_by_name(&mut self, name: &str) -> Result<bool>;
}

/// Insert `binding` at the end, dropping an existing binding of the same name
pub fn upsert(bindings: &mut Vec<GestureBinding>, binding: GestureBinding) {
    bindings.retain(|b| b.name != binding.name);
    bindings.push(binding);
}

/// Collapse duplicate names, keeping the last occurrence at its position
#[must_use]
pub fn dedupe_by_name(bindings: Vec<GestureBinding>) -> Vec<GestureBinding> {
    let mut out: Vec<GestureBinding> = Vec::with_capacity(bindings.len());
    for binding in bindings {
        if out.iter().any(|b| b.name == binding.name) {
            warn!("Duplicate gesture name '{}', keeping the latest record", binding.name);
        }
        upsert(&mut out, binding);
    }
    out
}

/// Decode a persisted store document.
///
/// The canonical document is an array of records. A map from gesture name
/// to record (as written by the first desktop tool) is accepted too.
/// Records that fail to decode are skipped with a warning.
///
/// # Errors
///
/// Returns `StoreError` when the document is neither an array nor an object.
pub fn decode_records(document: Value) -> Result<Vec<GestureBinding>> {
    let records: Vec<Value> = match document {
        Value::Array(items) => items,
        Value::Object(map) => map
            .into_iter()
            .map(|(name, mut record)| {
                if let Value::Object(fields) = &mut record {
                    fields.entry("name").or_insert(Value::String(name));
                }
                record
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            return Err(Error::StoreError(format!(
                "gesture store must be a list of records, found {}",
                value_kind(&other)
            )))
        }
    };

    let mut bindings = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<GestureBinding>(record) {
            Ok(binding) => bindings.push(binding),
            Err(e) => warn!("Skipping malformed gesture record {}: {}", index, e),
        }
    }
    Ok(dedupe_by_name(bindings))
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Gesture store backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store at `path`; the file is created on first write
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| "gestures.json".into(), std::ffi::OsStr::to_os_string);
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_all(&self, bindings: &[GestureBinding]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(bindings)?;

        // replace the store in one step so an interrupted write never leaves a truncated file
        let staging = self.staging_path();
        std::fs::write(&staging, content)
            .map_err(|e| Error::IoError(format!("Failed to write {}: {e}", staging.display())))?;
        if let Err(e) = std::fs::rename(&staging, &self.path) {
            let _ = std::fs::remove_file(&staging);
            return Err(Error::IoError(format!("Failed to replace {}: {e}", self.path.display())));
        }
        debug!("Wrote {} gestures to {}", bindings.len(), self.path.display());
        Ok(())
    }
}

impl GestureStore for JsonFileStore {
    fn load_all(&self) -> Result<Vec<GestureBinding>> {
        if !self.path.exists() {
            debug!("Gesture store {} does not exist yet", self.path.display());
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", self.path.display())))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let document: Value = serde_json::from_str(&content)?;
        let bindings = decode_records(document)?;
        info!("Loaded {} gestures from {}", bindings.len(), self.path.display());
        Ok(bindings)
    }

    fn append(&mut self, binding: GestureBinding) -> Result<()> {
        let mut bindings = self.load_all()?;
        info!("Saving gesture '{}' bound to '{}'", binding.name, binding.bound_key);
        upsert(&mut bindings, binding);
        self.write_all(&bindings)
    }

    fn delete_by_name(&mut self, name: &str) -> Result<bool> {
        let mut bindings = self.load_all()?;
        let before = bindings.len();
        bindings.retain(|b| b.name != name);
        if bindings.len() == before {
            return Ok(false);
        }
        info!("Deleting gesture '{}'", name);
        self.write_all(&bindings)?;
        Ok(true)
    }
}

/// In-memory gesture store; clones share the same bindings
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    bindings: Arc<Mutex<Vec<GestureBinding>>>,
}

impl MemoryStore {
    /// Create a store holding `bindings`
    #[must_use]
    pub fn with_bindings(bindings: Vec<GestureBinding>) -> Self {
        Self {
            bindings: Arc::new(Mutex::new(dedupe_by_name(bindings))),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<GestureBinding>>> {
        self.bindings
            .lock()
            .map_err(|_| Error::StoreError("gesture store lock poisoned".to_string()))
    }
}

impl GestureStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<GestureBinding>> {
        Ok(self.lock()?.clone())
    }

    fn append(&mut self, binding: GestureBinding) -> Result<()> {
        upsert(&mut *self.lock()?, binding);
        Ok(())
    }

    fn delete_by_name(&mut self, name: &str) -> Result<bool> {
        let mut bindings = self.lock()?;
        let before = bindings.len();
        bindings.retain(|b| b.name != name);
        Ok(bindings.len() != before)
    }
}
