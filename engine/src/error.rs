//! Error types for the Paddock engine.
//!
//! The reconciler operations themselves are total. Errors only come from
//! parsing identifiers, decoding persisted rollback contexts, and settling a
//! mutation without what it needs.

use crate::{EntityKind, RecordId};
use thiserror::Error;

/// All possible errors from the Paddock engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid temporary id: {0}")]
    InvalidTempId(String),

    #[error("invalid rollback context: {0}")]
    InvalidContext(String),

    #[error("server record required to confirm {0}")]
    MissingServerRecord(RecordId),

    #[error("mutation for '{actual}' cannot be applied to a '{expected}' query")]
    KindMismatch {
        expected: EntityKind,
        actual: EntityKind,
    },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
