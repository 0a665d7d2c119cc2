//! Patch locally held rows from change events
//!
//! `insert` / `replace` upsert the full document, `update` merges the
//! updated fields into the matching row, `delete` removes it. Applying the
//! same event twice leaves the rows as after the first time.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::message::{ChangeEvent, OperationType};
use shared::models::Document;

/// Apply `change` to `rows`; `Ok(true)` when a row was touched
///
/// Updates for rows not held locally are ignored. A row whose merged
/// document no longer decodes is left as it was and the error returned.
pub fn apply_change<T>(rows: &mut Vec<T>, change: &ChangeEvent) -> Result<bool, serde_json::Error>
where
    T: Document + Serialize + DeserializeOwned,
{
    apply_change_by(rows, change, T::document_id)
}

/// [`apply_change`] with a custom key
pub fn apply_change_by<T, F>(
    rows: &mut Vec<T>,
    change: &ChangeEvent,
    id_of: F,
) -> Result<bool, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
    F: Fn(&T) -> &str,
{
    let Some(id) = change.document_id() else {
        tracing::debug!(op = %change.operation_type, "Change without document id ignored");
        return Ok(false);
    };
    let position = rows.iter().position(|row| id_of(row) == id);

    match change.operation_type {
        OperationType::Insert | OperationType::Replace => {
            let Some(document) = change.full_document_as::<T>() else {
                return Ok(false);
            };
            let document = document?;
            match position {
                Some(index) => rows[index] = document,
                None => rows.push(document),
            }
            Ok(true)
        }
        OperationType::Update => {
            let (Some(index), Some(description)) = (position, &change.update_description) else {
                return Ok(false);
            };
            let mut merged = serde_json::to_value(&rows[index])?;
            for (path, value) in &description.updated_fields {
                set_path(&mut merged, path, value.clone());
            }
            for path in &description.removed_fields {
                remove_path(&mut merged, path);
            }
            rows[index] = serde_json::from_value(merged)?;
            Ok(true)
        }
        OperationType::Delete => match position {
            Some(index) => {
                rows.remove(index);
                Ok(true)
            }
            None => Ok(false),
        },
        OperationType::Other => Ok(false),
    }
}

/// `"services.0.price"` -> `/services/0/price`
fn parent_of<'a>(target: &'a mut Value, path: &'a str) -> Option<(&'a mut Value, &'a str)> {
    match path.rsplit_once('.') {
        Some((parent, leaf)) => {
            let pointer = format!("/{}", parent.replace('.', "/"));
            target.pointer_mut(&pointer).map(|parent| (parent, leaf))
        }
        None => Some((target, path)),
    }
}

fn set_path(target: &mut Value, path: &str, value: Value) {
    match parent_of(target, path) {
        Some((Value::Object(map), leaf)) => {
            map.insert(leaf.to_string(), value);
        }
        Some((Value::Array(items), leaf)) => {
            if let Some(slot) = leaf.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                *slot = value;
            }
        }
        _ => tracing::debug!(path, "Updated field has no parent locally"),
    }
}

fn remove_path(target: &mut Value, path: &str) {
    match parent_of(target, path) {
        Some((Value::Object(map), leaf)) => {
            map.remove(leaf);
        }
        Some((Value::Array(items), leaf)) => {
            if let Some(slot) = leaf.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                *slot = Value::Null;
            }
        }
        _ => {}
    }
}
