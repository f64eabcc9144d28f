//! Entity handlers - validate requests and apply them to the record store.
//!
//! Temporary ids only ever exist on clients. A request that names one is a
//! client bug (it tried to update or delete before its create settled), so
//! it is rejected instead of answered with 404.

use crate::error::{AppError, Result};
use crate::AppState;
use paddock_engine::{is_temp_id, JsonRecord};
use serde_json::{Map, Value};

/// Kinds are path segments: lowercase ASCII letters, digits, `_` and `-`.
pub fn is_valid_kind(kind: &str) -> bool {
    !kind.is_empty()
        && kind
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}

fn check_kind(kind: &str) -> Result<()> {
    if is_valid_kind(kind) {
        Ok(())
    } else {
        Err(AppError::InvalidKind(kind.to_string()))
    }
}

fn check_id(id: &str) -> Result<()> {
    if is_temp_id(id) {
        Err(AppError::TemporaryId(id.to_string()))
    } else {
        Ok(())
    }
}

fn check_available(state: &AppState, kind: &str) -> Result<()> {
    if state.config.should_fail(kind) {
        Err(AppError::Unavailable(kind.to_string()))
    } else {
        Ok(())
    }
}

fn into_fields(body: Value) -> Result<Map<String, Value>> {
    match body {
        Value::Object(fields) => Ok(fields),
        other => Err(AppError::BadRequest(format!(
            "expected a JSON object, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// List every record of `kind`.
pub fn handle_list(state: &AppState, kind: &str) -> Result<Vec<JsonRecord>> {
    check_kind(kind)?;
    Ok(state.store.list(kind))
}

/// Fetch one record.
pub fn handle_get(state: &AppState, kind: &str, id: &str) -> Result<JsonRecord> {
    check_kind(kind)?;
    check_id(id)?;
    state.store.get(kind, id).ok_or_else(|| not_found(kind, id))
}

/// Create a record from a JSON object of domain fields.
pub fn handle_create(state: &AppState, kind: &str, body: Value) -> Result<JsonRecord> {
    check_kind(kind)?;
    check_available(state, kind)?;
    let fields = into_fields(body)?;

    let record = state.store.insert(kind, fields);
    tracing::info!("Created {} {}", kind, record.id);
    Ok(record)
}

/// Shallow-merge a JSON object into an existing record.
pub fn handle_update(state: &AppState, kind: &str, id: &str, body: Value) -> Result<JsonRecord> {
    check_kind(kind)?;
    check_id(id)?;
    check_available(state, kind)?;
    let patch = into_fields(body)?;

    let record = state
        .store
        .update(kind, id, patch)
        .ok_or_else(|| not_found(kind, id))?;
    tracing::info!("Updated {} {}", kind, id);
    Ok(record)
}

/// Delete a record.
pub fn handle_delete(state: &AppState, kind: &str, id: &str) -> Result<()> {
    check_kind(kind)?;
    check_id(id)?;
    check_available(state, kind)?;

    if !state.store.delete(kind, id) {
        return Err(not_found(kind, id));
    }
    tracing::info!("Deleted {} {}", kind, id);
    Ok(())
}

fn not_found(kind: &str, id: &str) -> AppError {
    AppError::NotFound {
        kind: kind.to_string(),
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;

    #[test]
    fn kind_validation() {
        for kind in ["batch", "health-record", "inventory_item", "v2"] {
            assert!(is_valid_kind(kind), "{kind}");
        }
        for kind in ["", "Batch", "sale/1", "with space", "vënte"] {
            assert!(!is_valid_kind(kind), "{kind}");
        }
    }

    #[test]
    fn create_rejects_non_object() {
        let state = AppState::new(Config::default());
        let result = handle_create(&state, "batch", json!(["Broiler"]));
        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg.contains("array")));
        assert_eq!(state.store.count("batch"), 0);
    }

    #[test]
    fn temp_ids_are_rejected_before_lookup() {
        let state = AppState::new(Config::default());
        let temp = paddock_engine::generate_entity_temp_id("batch");

        assert!(matches!(
            handle_get(&state, "batch", temp.as_str()),
            Err(AppError::TemporaryId(_))
        ));
        assert!(matches!(
            handle_delete(&state, "batch", temp.as_str()),
            Err(AppError::TemporaryId(_))
        ));
    }

    #[test]
    fn failure_injection_only_blocks_mutations() {
        let state = AppState::new(Config::default().with_fail_kinds(["sale"]));

        assert!(matches!(
            handle_create(&state, "sale", json!({"total": 5})),
            Err(AppError::Unavailable(_))
        ));
        assert!(handle_list(&state, "sale").unwrap().is_empty());
        assert!(handle_create(&state, "batch", json!({})).is_ok());
    }

    #[test]
    fn update_and_delete_unknown_ids() {
        let state = AppState::new(Config::default());
        assert!(matches!(
            handle_update(&state, "batch", "batch_missing", json!({})),
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            handle_delete(&state, "batch", "batch_missing"),
            Err(AppError::NotFound { .. })
        ));
    }
}
