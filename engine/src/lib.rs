//! # Paddock Engine
//!
//! Optimistic cache reconciliation for offline-capable farm records.
//!
//! A client creating a batch, recording a sale, or deleting a health record
//! should see the change immediately, before the server answers. This crate
//! applies those speculative changes to cached collections, tags them as
//! provisional, and later either reconciles them with the server's answer or
//! rolls them back.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine never touches the network or disk
//! - **Copy-on-write**: operations borrow a collection and return a new one
//! - **Total**: reconciler operations never fail; unknown ids are no-ops
//! - **Typed state**: confirmation state and temp ids live in [`Tracked`]
//!   and [`Id`] instead of ad hoc flags
//!
//! ## Core Concepts
//!
//! ### Identifiers
//!
//! Records created locally carry a [`TempId`] from
//! [`generate_entity_temp_id`] until the server assigns a real id.
//! [`is_temp_id`] tells the two apart; [`Id`] classifies a wire id once.
//!
//! ### Reconciler
//!
//! - [`add_optimistic_record`] - append a provisional record
//! - [`update_by_id`] - patch a record and mark it provisional
//! - [`remove_by_id`] - drop a record
//! - [`replace_temp_id_with_record`] - swap a provisional record for the
//!   server's copy
//! - [`create_optimistic_context`] - snapshot for rollback
//!
//! ### Lifecycle
//!
//! [`Mutation::begin`] bundles snapshot and optimistic apply into a
//! [`PendingMutation`], which is consumed by exactly one of `confirm` or
//! `roll_back`. [`QueryCache`] runs the same lifecycle against cached
//! collections.
//!
//! ## Quick Start
//!
//! ```rust
//! use paddock_engine::{
//!     add_optimistic_record, create_optimistic_context, generate_entity_temp_id,
//!     replace_temp_id_with_record, JsonRecord, Tracked,
//! };
//! use serde_json::{json, Map, Value};
//!
//! fn fields(value: Value) -> Map<String, Value> {
//!     value.as_object().cloned().unwrap_or_default()
//! }
//!
//! let cached = vec![Tracked::confirmed(JsonRecord::new(
//!     "b1",
//!     fields(json!({"species": "Broiler", "status": "active"})),
//! ))];
//!
//! // 1. Snapshot, then apply the optimistic create
//! let temp_id = generate_entity_temp_id("batch");
//! let context = create_optimistic_context(Some(cached.as_slice()), Some(temp_id.clone()));
//! let optimistic = add_optimistic_record(
//!     Some(cached.as_slice()),
//!     fields(json!({"species": "Catfish", "status": "active"})),
//!     &temp_id,
//! );
//! assert_eq!(optimistic.len(), 2);
//! assert!(optimistic[1].is_optimistic());
//!
//! // 2a. The server answered: swap in its record
//! let server = JsonRecord::new("b2", fields(json!({"species": "Catfish", "status": "active"})));
//! let settled = replace_temp_id_with_record(&optimistic, &temp_id, server);
//! assert_eq!(settled[1].id(), "b2");
//! assert!(!settled[1].is_optimistic());
//!
//! // 2b. The call failed instead: put the snapshot back
//! assert_eq!(context.restore(), cached);
//! ```

pub mod cache;
pub mod context;
pub mod error;
pub mod id;
pub mod mutation;
pub mod reconcile;
pub mod record;

// Re-export main types at crate root
pub use cache::{QueryCache, QueryKey};
pub use context::{create_optimistic_context, RollbackContext, CONTEXT_FORMAT_VERSION};
pub use error::Error;
pub use id::{generate_entity_temp_id, is_temp_id, Id, TempId, TEMP_ID_PREFIX};
pub use mutation::{Mutation, MutationOp, MutationState, PendingMutation, Resolution};
pub use reconcile::{
    add_optimistic_record, confirm_by_id, find_by_id, optimistic_count, remove_by_id,
    replace_by_id, replace_temp_id_with_record, update_by_id,
};
pub use record::{Entity, JsonRecord, Tracked};

/// Type aliases for clarity
pub type RecordId = String;
pub type EntityKind = String;
