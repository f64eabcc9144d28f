//! Record storage keyed by entity kind.

use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use paddock_engine::{Entity, EntityKind, JsonRecord};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Fields stamped by the server and never taken from a request body.
const SERVER_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// Shared record store. Cloning shares the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Arc<DashMap<EntityKind, Vec<JsonRecord>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records of `kind`, in creation order.
    pub fn list(&self, kind: &str) -> Vec<JsonRecord> {
        self.records
            .get(kind)
            .map(|records| records.value().clone())
            .unwrap_or_default()
    }

    pub fn get(&self, kind: &str, id: &str) -> Option<JsonRecord> {
        self.records
            .get(kind)?
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    /// Persist a new record built from `fields` and return it.
    pub fn insert(&self, kind: &str, fields: Map<String, Value>) -> JsonRecord {
        let now = timestamp();
        let mut record = JsonRecord::new(new_record_id(kind), without_server_fields(fields));
        record.set("createdAt", Value::String(now.clone()));
        record.set("updatedAt", Value::String(now));

        self.records
            .entry(kind.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    /// Shallow-merge `patch` into an existing record.
    ///
    /// Returns `None` if no record of `kind` has `id`.
    pub fn update(&self, kind: &str, id: &str, patch: Map<String, Value>) -> Option<JsonRecord> {
        let mut records = self.records.get_mut(kind)?;
        let record = records.iter_mut().find(|record| record.id == id)?;

        record.apply_patch(&without_server_fields(patch));
        record.set("updatedAt", Value::String(timestamp()));
        Some(record.clone())
    }

    /// Returns whether a record was removed.
    pub fn delete(&self, kind: &str, id: &str) -> bool {
        let Some(mut records) = self.records.get_mut(kind) else {
            return false;
        };
        let before = records.len();
        records.retain(|record| record.id != id);
        records.len() != before
    }

    pub fn count(&self, kind: &str) -> usize {
        self.records.get(kind).map_or(0, |records| records.len())
    }

    /// Record count per kind, for kinds that currently hold records.
    pub fn counts(&self) -> BTreeMap<EntityKind, usize> {
        self.records
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| (entry.key().clone(), entry.value().len()))
            .collect()
    }
}

/// Persisted ids look like `batch_9f0c...`, never like a temp id.
fn new_record_id(kind: &str) -> String {
    format!("{}_{}", kind, Uuid::new_v4().simple())
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn without_server_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    for field in SERVER_FIELDS {
        fields.remove(field);
    }
    fields
}
