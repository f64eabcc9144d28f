//! Optimistic reconciliation over cached collections.
//!
//! Every function here takes a collection snapshot by reference and returns a
//! fresh `Vec`. Inputs are never mutated, nothing is logged, and no function
//! can fail: an id that matches nothing is simply a no-op.
//!
//! # Lifecycle
//!
//! 1. Snapshot the cached collection with
//!    [`create_optimistic_context`](crate::create_optimistic_context)
//! 2. Apply [`add_optimistic_record`], [`update_by_id`] or [`remove_by_id`]
//! 3. Issue the remote call
//! 4. On success resolve with [`replace_temp_id_with_record`] (creates) or
//!    [`confirm_by_id`] (updates); on failure put the snapshot back
//!
//! Ids are expected to be unique within a collection. When they are not,
//! updates and removals touch every match while replacement resolves the
//! first one.

use crate::{Entity, TempId, Tracked};

/// Append a new optimistic record built from `draft`, carrying `temp_id`.
///
/// `None` is treated as an empty collection.
pub fn add_optimistic_record<T: Entity>(
    collection: Option<&[Tracked<T>]>,
    draft: T::Draft,
    temp_id: &TempId,
) -> Vec<Tracked<T>> {
    let existing = collection.unwrap_or_default();
    let record = T::from_draft(temp_id.to_string(), draft);

    let mut next = Vec::with_capacity(existing.len() + 1);
    next.extend_from_slice(existing);
    next.push(Tracked::optimistic(record, Some(temp_id.clone())));
    next
}

/// Merge `patch` into the record at `id` and mark it optimistic.
pub fn update_by_id<T: Entity>(
    collection: &[Tracked<T>],
    id: &str,
    patch: &T::Patch,
) -> Vec<Tracked<T>> {
    collection
        .iter()
        .map(|item| {
            if item.id() == id {
                item.clone().patched(patch)
            } else {
                item.clone()
            }
        })
        .collect()
}

/// Drop the record at `id`, keeping the rest in order.
///
/// `None` is treated as an empty collection.
pub fn remove_by_id<T: Entity>(collection: Option<&[Tracked<T>]>, id: &str) -> Vec<Tracked<T>> {
    collection
        .unwrap_or_default()
        .iter()
        .filter(|item| item.id() != id)
        .cloned()
        .collect()
}

/// Swap the provisional record at `temp_id` for the server's record.
///
/// The server record takes the provisional record's position and is
/// confirmed. If no record carries `temp_id` the server record is appended.
/// A stale copy already holding the server id (say, from a refetch that
/// landed first) is dropped so ids stay unique.
pub fn replace_temp_id_with_record<T: Entity>(
    collection: &[Tracked<T>],
    temp_id: &TempId,
    server_record: T,
) -> Vec<Tracked<T>> {
    let server_id = server_record.id().to_owned();
    let mut replacement = Some(Tracked::confirmed(server_record));

    let mut next = Vec::with_capacity(collection.len() + 1);
    for item in collection {
        if item.id() == temp_id.as_str() {
            // Later copies of the same temp id describe the same record.
            if let Some(record) = replacement.take() {
                next.push(record);
            }
        } else if item.id() != server_id {
            next.push(item.clone());
        }
    }

    if let Some(record) = replacement {
        next.push(record);
    }
    next
}

/// Replace the record at `id` with a confirmed server copy.
///
/// Unlike [`replace_temp_id_with_record`] nothing is appended when `id` is
/// absent: the record was removed locally after the update was issued.
pub fn replace_by_id<T: Entity>(
    collection: &[Tracked<T>],
    id: &str,
    server_record: T,
) -> Vec<Tracked<T>> {
    collection
        .iter()
        .map(|item| {
            if item.id() == id {
                Tracked::confirmed(server_record.clone())
            } else {
                item.clone()
            }
        })
        .collect()
}

/// Accept the local state of the record at `id` as final.
pub fn confirm_by_id<T: Entity>(collection: &[Tracked<T>], id: &str) -> Vec<Tracked<T>> {
    collection
        .iter()
        .map(|item| {
            if item.id() == id {
                item.clone().confirm()
            } else {
                item.clone()
            }
        })
        .collect()
}

pub fn find_by_id<'a, T: Entity>(collection: &'a [Tracked<T>], id: &str) -> Option<&'a Tracked<T>> {
    collection.iter().find(|item| item.id() == id)
}

/// Number of records still awaiting confirmation.
pub fn optimistic_count<T>(collection: &[Tracked<T>]) -> usize {
    collection.iter().filter(|item| item.is_optimistic()).count()
}
