//! Rollback contexts for undoing optimistic mutations.
//!
//! A context is captured right before an optimistic operation touches the
//! cache. If the remote call fails the caller restores
//! [`RollbackContext::previous_data`] verbatim; if it succeeds the context is
//! dropped. Contexts serialize to JSON so a mutation queued while offline can
//! survive an app restart.

use crate::{error::Result, Error, TempId, Tracked};
use serde::{Deserialize, Serialize};

/// Version of the serialized context format.
pub const CONTEXT_FORMAT_VERSION: u32 = 1;

/// Snapshot of a collection taken before a speculative mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackContext<T> {
    format_version: u32,
    previous_data: Vec<Tracked<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temp_id: Option<TempId>,
}

/// Capture `previous` (treated as empty when absent) and the temp id of a
/// pending create, if any.
pub fn create_optimistic_context<T: Clone>(
    previous: Option<&[Tracked<T>]>,
    temp_id: Option<TempId>,
) -> RollbackContext<T> {
    RollbackContext {
        format_version: CONTEXT_FORMAT_VERSION,
        previous_data: previous.unwrap_or_default().to_vec(),
        temp_id,
    }
}

impl<T> RollbackContext<T> {
    /// The collection as it was before the mutation.
    pub fn previous_data(&self) -> &[Tracked<T>] {
        &self.previous_data
    }

    /// The temp id generated for a create, if this context belongs to one.
    pub fn temp_id(&self) -> Option<&TempId> {
        self.temp_id.as_ref()
    }

    /// Consume the context, yielding the collection to put back in the cache.
    pub fn restore(self) -> Vec<Tracked<T>> {
        self.previous_data
    }
}

impl<T: Serialize> RollbackContext<T> {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidContext(e.to_string()))
    }
}

impl<T: for<'de> Deserialize<'de>> RollbackContext<T> {
    pub fn from_json(json: &str) -> Result<Self> {
        let context: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidContext(e.to_string()))?;

        if context.format_version > CONTEXT_FORMAT_VERSION {
            return Err(Error::InvalidContext(format!(
                "unsupported context format version: {} (max supported: {})",
                context.format_version, CONTEXT_FORMAT_VERSION
            )));
        }

        Ok(context)
    }
}
