//! Backup snapshot codec.
//!
//! A backup is a JSON array of entries, each wrapping one cube under `data`:
//!
//! ```json
//! [{ "data": { "id": "c1", "name": "Speed", "category": "3x3", ... } }]
//! ```
//!
//! A response that is not an array is rejected as a whole. Inside the array,
//! an entry that does not hold a valid cube is skipped, and for a repeated
//! cube id the first occurrence is kept. Skipped entries are reported so the
//! caller can surface them.

use crate::{error::Result, Cube, Error};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// One element of a backup array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupEntry {
    pub data: Cube,
}

/// A decoded backup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Backup {
    /// Usable cubes, in backup order
    pub cubes: Vec<Cube>,
    /// Why each unusable entry was left out
    pub skipped: Vec<Error>,
}

impl Backup {
    /// Whether every entry was used.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Decode a backup response.
///
/// Fails only when the response is not an array.
pub fn decode_backup(value: &Value) -> Result<Backup> {
    let items = value.as_array().ok_or_else(|| {
        Error::InvalidSnapshot(format!("expected an array, got {}", kind(value)))
    })?;

    let mut backup = Backup {
        cubes: Vec::with_capacity(items.len()),
        skipped: Vec::new(),
    };
    let mut seen = HashSet::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let entry = match BackupEntry::deserialize(item) {
            Ok(entry) => entry,
            Err(e) => {
                backup
                    .skipped
                    .push(Error::InvalidSnapshot(format!("entry {}: {}", index, e)));
                continue;
            }
        };

        if !seen.insert(entry.data.id.clone()) {
            backup.skipped.push(Error::DuplicateCubeId(entry.data.id));
            continue;
        }
        backup.cubes.push(entry.data);
    }

    Ok(backup)
}

/// Encode cubes in the backup wire shape.
pub fn encode_backup(cubes: &[Cube]) -> Value {
    Value::Array(
        cubes
            .iter()
            .map(|cube| serde_json::json!({ "data": cube }))
            .collect(),
    )
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
