//! Temporary and persisted record identifiers.
//!
//! A record created while the server has not answered yet gets a temporary
//! id. Temporary ids carry a reserved prefix that server-assigned ids never
//! use, so the two can always be told apart from the string alone.
//!
//! On the wire both kinds are plain strings. Inside the engine they are
//! parsed once into [`Id`] so callers match on a variant instead of
//! re-checking the prefix.

use crate::{error::Result, Error, RecordId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix reserved for client-generated ids.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Length of a hyphenated uuid, the suffix of every generated temp id.
const UUID_LEN: usize = 36;

/// Generate a fresh temporary id for a record of `entity_kind`.
///
/// The id has the shape `temp-<entity_kind>-<uuid>`.
pub fn generate_entity_temp_id(entity_kind: &str) -> TempId {
    TempId(format!("{TEMP_ID_PREFIX}{entity_kind}-{}", Uuid::new_v4()))
}

/// Check whether `id` was generated on the client.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// A client-generated placeholder id.
///
/// Only constructible through [`generate_entity_temp_id`] or [`TempId::parse`],
/// so a `TempId` always satisfies [`is_temp_id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TempId(String);

impl TempId {
    /// Parse a temporary id received from elsewhere (storage, another tab).
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if is_temp_id(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidTempId(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The entity kind embedded by [`generate_entity_temp_id`].
    ///
    /// Returns `None` for temp ids that were not generated in that shape.
    pub fn entity_kind(&self) -> Option<&str> {
        let rest = self.0.strip_prefix(TEMP_ID_PREFIX)?;
        let split = rest.len().checked_sub(UUID_LEN + 1)?;
        if split == 0 || rest.as_bytes()[split] != b'-' {
            return None;
        }
        Uuid::parse_str(&rest[split + 1..]).ok()?;
        rest.get(..split)
    }
}

impl TryFrom<String> for TempId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<TempId> for String {
    fn from(id: TempId) -> Self {
        id.0
    }
}

impl AsRef<str> for TempId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record id, classified once at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Id {
    /// Assigned by the client, not yet known to the server
    Temporary(TempId),
    /// Assigned by the server
    Persisted(RecordId),
}

impl Id {
    /// Classify a wire id by its prefix.
    pub fn parse(value: impl Into<String>) -> Self {
        let value = value.into();
        if is_temp_id(&value) {
            Id::Temporary(TempId(value))
        } else {
            Id::Persisted(value)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Id::Temporary(id) => id.as_str(),
            Id::Persisted(id) => id,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Id::Temporary(_))
    }

    /// The temp id, if this id is still provisional.
    pub fn as_temp(&self) -> Option<&TempId> {
        match self {
            Id::Temporary(id) => Some(id),
            Id::Persisted(_) => None,
        }
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Id::parse(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::parse(value)
    }
}

impl From<TempId> for Id {
    fn from(id: TempId) -> Self {
        Id::Temporary(id)
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        match id {
            Id::Temporary(id) => id.into_string(),
            Id::Persisted(id) => id,
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
