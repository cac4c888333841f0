// Persisted configuration subset
//
// Only a safe subset of the configuration survives across sessions: the
// tool versions, the source type, and the AST-view mode, stored as one
// JSON document under a single key. Editor documents are never persisted.

use std::sync::RwLock;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{AstView, ConfigModel, ConfigPatch, SourceType};

/// Storage key for the persisted configuration document.
pub const STORAGE_KEY: &str = "config";

/// Key/value persistence contract.
///
/// The host environment supplies the real backing store; reads and writes
/// are whole-string, and writes are fire-and-forget the way browser local
/// storage is used here.
pub trait StoragePort: Send + Sync {
    /// Read the stored value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);
}

/// In-memory [`StoragePort`] used by tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<IndexMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

/// Validation errors for the stored configuration document as a whole.
///
/// Field-level problems never surface here: a field of the wrong shape is
/// dropped during validation, not turned into an error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("stored configuration is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("stored configuration is not a JSON object")]
    NotAnObject,
}

/// Load and validate the persisted subset, as a patch over defaults.
///
/// Returns `None` when nothing usable is stored; an unreadable document is
/// logged and ignored, never an error to the caller.
pub fn load_stored_config(storage: &dyn StoragePort) -> Option<ConfigPatch> {
    let raw = storage.get(STORAGE_KEY)?;
    match parse_stored_config(&raw) {
        Ok(patch) => Some(patch),
        Err(err) => {
            warn!("ignoring stored configuration: {}", err);
            None
        }
    }
}

/// Parse a stored configuration document into a patch, keeping only
/// well-shaped fields.
fn parse_stored_config(raw: &str) -> Result<ConfigPatch, StorageError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(map) = value else {
        return Err(StorageError::NotAnObject);
    };

    let show_ast = match map.get("showAST") {
        Some(Value::String(token)) => Some(AstView::parse(token)),
        Some(Value::Bool(false)) => Some(AstView::Off),
        Some(_) => {
            debug!("dropping stored `showAST` field with unexpected type");
            None
        }
        None => None,
    };

    Ok(ConfigPatch {
        ts: read_string_field(&map, "ts"),
        tse: read_string_field(&map, "tse"),
        source_type: read_string_field(&map, "sourceType")
            .map(|token| SourceType::parse(&token)),
        show_ast,
        ..Default::default()
    })
}

fn read_string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            debug!("dropping stored `{}` field with unexpected type", key);
            None
        }
        None => None,
    }
}

/// Persist the safe subset of `config`.
pub fn save_config(storage: &dyn StoragePort, config: &ConfigModel) {
    let show_ast = match config.show_ast.as_token() {
        Some(token) => Value::String(token.to_string()),
        None => Value::Bool(false),
    };
    let document = serde_json::json!({
        "ts": config.ts,
        "tse": config.tse,
        "sourceType": config.source_type.as_token(),
        "showAST": show_ast,
    });

    storage.set(STORAGE_KEY, &document.to_string());
    debug!("persisted configuration subset");
}
