//! OptimisticClient - the optimistic mutation flow against a [`Remote`].
//!
//! Every mutation runs the same steps: apply it to the cached collection
//! under a fresh rollback context, call the remote, then either swap in the
//! server's answer or restore the snapshot. Errors reach the caller only
//! after the cache has been put back.

use paddock_engine::{is_temp_id, JsonRecord, Mutation, QueryCache, QueryKey, Tracked};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::remote::Remote;

/// Caches entity collections and applies mutations to them optimistically.
pub struct OptimisticClient<R> {
    remote: R,
    cache: QueryCache<JsonRecord>,
}

impl<R: Remote> OptimisticClient<R> {
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            cache: QueryCache::new(),
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn cache(&self) -> &QueryCache<JsonRecord> {
        &self.cache
    }

    /// The collection currently cached for `kind`, provisional records
    /// included. Empty if nothing has been loaded.
    pub fn cached(&self, kind: &str) -> &[Tracked<JsonRecord>] {
        self.cache.get(&QueryKey::new(kind)).unwrap_or_default()
    }

    /// Whether `kind` should be refetched, either because it was never
    /// loaded or because a mutation settled since the last fetch.
    pub fn needs_refresh(&self, kind: &str) -> bool {
        let key = QueryKey::new(kind);
        self.cache.get(&key).is_none() || self.cache.is_stale(&key)
    }

    /// Replace the cached collection with the server's list.
    pub async fn refresh(&mut self, kind: &str) -> Result<&[Tracked<JsonRecord>]> {
        let records = self.remote.list(kind).await?;
        debug!(kind, count = records.len(), "Refreshed collection");

        let key = QueryKey::new(kind);
        self.cache
            .set(key.clone(), records.into_iter().map(Tracked::confirmed).collect());
        Ok(self.cache.get(&key).unwrap_or_default())
    }

    /// Refresh `kind` only if [`needs_refresh`](Self::needs_refresh).
    pub async fn load(&mut self, kind: &str) -> Result<&[Tracked<JsonRecord>]> {
        if self.needs_refresh(kind) {
            return self.refresh(kind).await;
        }
        Ok(self.cached(kind))
    }

    /// Create a record. It shows up in [`cached`](Self::cached) under a
    /// temporary id until the server answers.
    pub async fn create(&mut self, kind: &str, draft: Map<String, Value>) -> Result<JsonRecord> {
        let key = QueryKey::new(kind);
        let pending = self.cache.begin(&key, Mutation::create(kind, draft.clone()))?;

        match self.remote.create(kind, &draft).await {
            Ok(record) => {
                self.cache.settle_success(&key, pending, Some(record.clone()))?;
                Ok(record)
            }
            Err(err) => {
                let record = pending.target_id();
                warn!(kind, record, error = %err, "Create failed, rolling back");
                self.cache.settle_failure(&key, pending);
                Err(err)
            }
        }
    }

    /// Patch a confirmed record.
    ///
    /// Records still carrying a temporary id are refused with
    /// [`ClientError::Unsettled`] without contacting the server.
    pub async fn update(
        &mut self,
        kind: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<JsonRecord> {
        ensure_settled(id)?;

        let key = QueryKey::new(kind);
        let pending = self
            .cache
            .begin(&key, Mutation::update(kind, id, patch.clone()))?;

        match self.remote.update(kind, id, &patch).await {
            Ok(record) => {
                self.cache.settle_success(&key, pending, Some(record.clone()))?;
                Ok(record)
            }
            Err(err) => {
                warn!(kind, id, error = %err, "Update failed, rolling back");
                self.cache.settle_failure(&key, pending);
                Err(err)
            }
        }
    }

    /// Delete a confirmed record.
    pub async fn delete(&mut self, kind: &str, id: &str) -> Result<()> {
        ensure_settled(id)?;

        let key = QueryKey::new(kind);
        let pending = self.cache.begin(&key, Mutation::delete(kind, id))?;

        match self.remote.delete(kind, id).await {
            Ok(()) => {
                self.cache.settle_success(&key, pending, None)?;
                Ok(())
            }
            Err(err) => {
                warn!(kind, id, error = %err, "Delete failed, rolling back");
                self.cache.settle_failure(&key, pending);
                Err(err)
            }
        }
    }
}

fn ensure_settled(id: &str) -> Result<()> {
    if is_temp_id(id) {
        return Err(ClientError::Unsettled(id.to_string()));
    }
    Ok(())
}
