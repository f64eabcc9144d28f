//! Request handlers for entity operations.

mod entities;

pub use entities::*;
