//! QueryCache - the in-memory collection cache.
//!
//! The cache holds whatever collection the caller last set under each query
//! key. Writes go through `&mut self`, so there is a single writer and the
//! last applied write wins. Mutation helpers wire the pure reconciler
//! functions to the cache: snapshot, apply, then confirm or roll back.

use crate::{
    error::Result, Entity, EntityKind, Error, Mutation, PendingMutation, Resolution, Tracked,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Identifies one cached collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryKey {
    /// Entity kind the collection holds
    pub kind: EntityKind,
    /// Optional narrowing, e.g. a farm id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl QueryKey {
    pub fn new(kind: impl Into<EntityKind>) -> Self {
        Self {
            kind: kind.into(),
            scope: None,
        }
    }

    pub fn scoped(kind: impl Into<EntityKind>, scope: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            scope: Some(scope.into()),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}:{}", self.kind, scope),
            None => f.write_str(&self.kind),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    data: Vec<Tracked<T>>,
    stale: bool,
    in_flight: usize,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            stale: false,
            in_flight: 0,
        }
    }
}

/// Cached collections keyed by query.
#[derive(Debug, Clone)]
pub struct QueryCache<T> {
    entries: HashMap<QueryKey, Entry<T>>,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueryCache<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Get the collection cached under `key`.
    pub fn get(&self, key: &QueryKey) -> Option<&[Tracked<T>]> {
        self.entries.get(key).map(|entry| entry.data.as_slice())
    }

    /// Replace the collection under `key` and mark it fresh.
    pub fn set(&mut self, key: QueryKey, data: Vec<Tracked<T>>) {
        let entry = self.entries.entry(key).or_default();
        entry.data = data;
        entry.stale = false;
    }

    /// Drop a cached collection.
    pub fn remove(&mut self, key: &QueryKey) -> Option<Vec<Tracked<T>>> {
        self.entries.remove(key).map(|entry| entry.data)
    }

    /// Mark a collection as needing a refetch.
    ///
    /// Returns false if nothing is cached under `key`.
    pub fn invalidate(&mut self, key: &QueryKey) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.stale = true;
                true
            }
            None => false,
        }
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_some_and(|entry| entry.stale)
    }

    /// Number of mutations begun under `key` and not yet settled.
    pub fn in_flight(&self, key: &QueryKey) -> usize {
        self.entries.get(key).map_or(0, |entry| entry.in_flight)
    }

    pub fn keys(&self) -> impl Iterator<Item = &QueryKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write a settled result back and invalidate the key so the caller
    /// refetches.
    fn write_settled(&mut self, key: &QueryKey, data: Vec<Tracked<T>>) {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.data = data;
        entry.stale = true;
        entry.in_flight = entry.in_flight.saturating_sub(1);
    }
}

impl<T: Entity> QueryCache<T> {
    /// Apply `mutation` optimistically to the collection under `key`.
    ///
    /// The returned handle must be passed back to
    /// [`settle_success`](Self::settle_success) or
    /// [`settle_failure`](Self::settle_failure).
    pub fn begin(&mut self, key: &QueryKey, mutation: Mutation<T>) -> Result<PendingMutation<T>> {
        if mutation.kind() != key.kind {
            return Err(Error::KindMismatch {
                expected: key.kind.clone(),
                actual: mutation.kind().to_string(),
            });
        }

        let op = mutation.op();
        let (next, pending) = mutation.begin(self.get(key));

        let entry = self.entries.entry(key.clone()).or_default();
        entry.data = next;
        entry.in_flight += 1;

        debug!(
            key = %key,
            ?op,
            record = pending.target_id(),
            in_flight = entry.in_flight,
            "Optimistic mutation applied"
        );

        Ok(pending)
    }

    /// Confirm a pending mutation with the server's answer.
    ///
    /// A create confirmed without a server record cannot be resolved, so it
    /// is rolled back and [`Error::MissingServerRecord`] returned.
    pub fn settle_success(
        &mut self,
        key: &QueryKey,
        pending: PendingMutation<T>,
        server_record: Option<T>,
    ) -> Result<Resolution> {
        if pending.needs_server_record() && server_record.is_none() {
            let target = pending.target_id().to_string();
            warn!(key = %key, record = %target, "Create confirmed without a server record");
            self.settle_failure(key, pending);
            return Err(Error::MissingServerRecord(target));
        }

        let target = pending.target_id().to_string();
        let current = self.get(key).unwrap_or_default();
        let (next, resolution) = pending.confirm(current, server_record)?;
        self.write_settled(key, next);

        debug!(key = %key, record = %target, "Mutation confirmed");
        Ok(resolution)
    }

    /// Undo a failed mutation.
    ///
    /// Only this mutation's own effect is reverted, so anything other
    /// mutations settled on `key` since it began survives. When nothing else
    /// touched the collection the result equals the pending mutation's
    /// snapshot.
    pub fn settle_failure(&mut self, key: &QueryKey, pending: PendingMutation<T>) -> Resolution {
        let target = pending.target_id().to_string();
        let current = self.get(key).unwrap_or_default();
        let (next, resolution) = pending.roll_back_onto(current);
        self.write_settled(key, next);

        debug!(key = %key, record = %target, "Mutation rolled back");
        resolution
    }
}
