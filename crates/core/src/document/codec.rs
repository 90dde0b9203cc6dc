//! JSON encoding and decoding of snapshot documents.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::info;

use super::error::DocumentError;
use crate::store::LedgerState;

/// Highest document format this build reads and the one it writes.
pub const FORMAT_VERSION: u64 = 1;

const FORMAT_VERSION_KEY: &str = "formatVersion";
const EXPORTED_AT_KEY: &str = "exportedAt";
const REQUIRED_COLLECTIONS: [&str; 2] = ["projects", "vendors"];

/// Encodes `state` as a document value stamped with `exported_at`.
///
/// # Errors
///
/// Returns `DocumentError::Schema` if the state cannot be serialized.
pub fn encode_value(state: &LedgerState, exported_at: DateTime<Utc>) -> Result<Value, DocumentError> {
    let value = serde_json::to_value(state).map_err(|e| DocumentError::Schema(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(DocumentError::NotAnObject);
    };

    let mut document = Map::with_capacity(fields.len() + 2);
    document.insert(FORMAT_VERSION_KEY.to_string(), Value::from(FORMAT_VERSION));
    document.insert(
        EXPORTED_AT_KEY.to_string(),
        Value::String(exported_at.to_rfc3339()),
    );
    document.extend(fields);
    Ok(Value::Object(document))
}

/// Encodes `state` as pretty-printed document text.
///
/// # Errors
///
/// Returns `DocumentError::Schema` if the state cannot be serialized.
pub fn encode(state: &LedgerState, exported_at: DateTime<Utc>) -> Result<String, DocumentError> {
    let value = encode_value(state, exported_at)?;
    serde_json::to_string_pretty(&value).map_err(|e| DocumentError::Schema(e.to_string()))
}

/// Encodes `state` stamped with the current time.
///
/// # Errors
///
/// Returns `DocumentError::Schema` if the state cannot be serialized.
pub fn export(state: &LedgerState) -> Result<String, DocumentError> {
    encode(state, Utc::now())
}

/// Decodes a document value.
///
/// `projects` and `vendors` must be present as arrays; every other
/// collection defaults to empty.
///
/// # Errors
///
/// Returns `DocumentError` if the value is not a readable document.
pub fn decode_value(value: Value) -> Result<LedgerState, DocumentError> {
    let Value::Object(mut fields) = value else {
        return Err(DocumentError::NotAnObject);
    };

    for key in REQUIRED_COLLECTIONS {
        if !fields.get(key).is_some_and(Value::is_array) {
            return Err(DocumentError::MissingCollection(key));
        }
    }

    if let Some(version) = fields.remove(FORMAT_VERSION_KEY) {
        let found = version
            .as_u64()
            .ok_or_else(|| DocumentError::Schema("formatVersion must be an integer".into()))?;
        if found > FORMAT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found,
                supported: FORMAT_VERSION,
            });
        }
    }
    fields.remove(EXPORTED_AT_KEY);

    serde_json::from_value(Value::Object(fields)).map_err(|e| DocumentError::Schema(e.to_string()))
}

/// Decodes document text.
///
/// # Errors
///
/// Returns `DocumentError` if the text is not a readable document.
pub fn decode(text: &str) -> Result<LedgerState, DocumentError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| DocumentError::Malformed(e.to_string()))?;
    decode_value(value)
}

/// Decodes document text as a replacement for `current`.
///
/// The signed-in user of `current` is kept and the revision never moves
/// backwards.
///
/// # Errors
///
/// Returns `DocumentError` if the text is not a readable document.
pub fn import(current: &LedgerState, text: &str) -> Result<LedgerState, DocumentError> {
    let mut imported = decode(text)?;
    imported.current_user = current.current_user.clone();
    imported.revision = imported.revision.max(current.revision);

    info!(
        projects = imported.projects.len(),
        vendors = imported.vendors.len(),
        materials = imported.materials.len(),
        revision = imported.revision,
        "snapshot document imported"
    );
    Ok(imported)
}
