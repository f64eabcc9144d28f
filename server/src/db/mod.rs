//! In-memory persistence for entity records.

mod records;

pub use records::*;
