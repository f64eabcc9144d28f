//! Mutations and their lifecycle.
//!
//! Changes are expressed as mutations. Beginning a mutation applies its
//! optimistic effect and returns a [`PendingMutation`] holding the rollback
//! context. The pending mutation is then consumed by exactly one of
//! [`PendingMutation::confirm`], [`PendingMutation::roll_back`] or
//! [`PendingMutation::roll_back_onto`], so a mutation can never be resolved
//! twice.
//!
//! ```text
//! Pending ──confirm──▶ Confirmed
//!    │
//!    └──roll_back──▶ RolledBack
//! ```

use crate::{
    add_optimistic_record, confirm_by_id, create_optimistic_context, error::Result,
    find_by_id, generate_entity_temp_id, remove_by_id, replace_by_id,
    replace_temp_id_with_record, update_by_id, Entity, EntityKind, Error, RecordId,
    RollbackContext, TempId, Tracked,
};
use serde::{Deserialize, Serialize};

/// The kind of change a mutation makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationOp {
    Create,
    Update,
    Delete,
}

/// Where a mutation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationState {
    Pending,
    Confirmed,
    RolledBack,
}

/// How a pending mutation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resolution {
    /// The server accepted the change
    Confirmed,
    /// The remote call failed and the snapshot was restored
    RolledBack,
}

impl From<Resolution> for MutationState {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Confirmed => MutationState::Confirmed,
            Resolution::RolledBack => MutationState::RolledBack,
        }
    }
}

/// A change to one record of an entity kind.
pub enum Mutation<T: Entity> {
    Create {
        kind: EntityKind,
        draft: T::Draft,
    },
    Update {
        kind: EntityKind,
        id: RecordId,
        patch: T::Patch,
    },
    Delete {
        kind: EntityKind,
        id: RecordId,
    },
}

impl<T: Entity> Mutation<T> {
    pub fn create(kind: impl Into<EntityKind>, draft: T::Draft) -> Self {
        Mutation::Create {
            kind: kind.into(),
            draft,
        }
    }

    pub fn update(kind: impl Into<EntityKind>, id: impl Into<RecordId>, patch: T::Patch) -> Self {
        Mutation::Update {
            kind: kind.into(),
            id: id.into(),
            patch,
        }
    }

    pub fn delete(kind: impl Into<EntityKind>, id: impl Into<RecordId>) -> Self {
        Mutation::Delete {
            kind: kind.into(),
            id: id.into(),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Mutation::Create { kind, .. } => kind,
            Mutation::Update { kind, .. } => kind,
            Mutation::Delete { kind, .. } => kind,
        }
    }

    pub fn op(&self) -> MutationOp {
        match self {
            Mutation::Create { .. } => MutationOp::Create,
            Mutation::Update { .. } => MutationOp::Update,
            Mutation::Delete { .. } => MutationOp::Delete,
        }
    }

    /// Snapshot `current`, apply the optimistic effect, and return the new
    /// collection with the pending handle.
    ///
    /// Creates get a fresh temp id for their kind.
    pub fn begin(self, current: Option<&[Tracked<T>]>) -> (Vec<Tracked<T>>, PendingMutation<T>) {
        match self {
            Mutation::Create { kind, draft } => {
                let temp_id = generate_entity_temp_id(&kind);
                let context = create_optimistic_context(current, Some(temp_id.clone()));
                let next = add_optimistic_record(current, draft, &temp_id);
                (next, PendingMutation::new(kind, Target::Created(temp_id), context))
            }
            Mutation::Update { kind, id, patch } => {
                let context = create_optimistic_context(current, None);
                let next = update_by_id(current.unwrap_or_default(), &id, &patch);
                (next, PendingMutation::new(kind, Target::Updated(id), context))
            }
            Mutation::Delete { kind, id } => {
                let context = create_optimistic_context(current, None);
                let next = remove_by_id(current, &id);
                (next, PendingMutation::new(kind, Target::Deleted(id), context))
            }
        }
    }
}

#[derive(Debug)]
enum Target {
    Created(TempId),
    Updated(RecordId),
    Deleted(RecordId),
}

/// A mutation whose optimistic effect is applied but not yet resolved.
#[derive(Debug)]
#[must_use = "a pending mutation must be confirmed or rolled back"]
pub struct PendingMutation<T> {
    kind: EntityKind,
    target: Target,
    context: RollbackContext<T>,
}

impl<T: Entity> PendingMutation<T> {
    fn new(kind: EntityKind, target: Target, context: RollbackContext<T>) -> Self {
        Self {
            kind,
            target,
            context,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn op(&self) -> MutationOp {
        match self.target {
            Target::Created(_) => MutationOp::Create,
            Target::Updated(_) => MutationOp::Update,
            Target::Deleted(_) => MutationOp::Delete,
        }
    }

    /// The id the optimistic effect was applied under: the temp id for
    /// creates, the record id otherwise.
    pub fn target_id(&self) -> &str {
        match &self.target {
            Target::Created(temp_id) => temp_id.as_str(),
            Target::Updated(id) | Target::Deleted(id) => id,
        }
    }

    pub fn temp_id(&self) -> Option<&TempId> {
        self.context.temp_id()
    }

    pub fn context(&self) -> &RollbackContext<T> {
        &self.context
    }

    pub fn state(&self) -> MutationState {
        MutationState::Pending
    }

    /// Whether [`confirm`](Self::confirm) needs the server's record.
    pub fn needs_server_record(&self) -> bool {
        matches!(self.target, Target::Created(_))
    }

    /// Resolve against the server's answer.
    ///
    /// - create: the temp-id record is replaced by `server_record`
    /// - update: the record is replaced by `server_record` when given,
    ///   otherwise its local state is accepted as final
    /// - delete: the removal is kept
    pub fn confirm(
        self,
        current: &[Tracked<T>],
        server_record: Option<T>,
    ) -> Result<(Vec<Tracked<T>>, Resolution)> {
        let next = match (self.target, server_record) {
            (Target::Created(temp_id), Some(record)) => {
                replace_temp_id_with_record(current, &temp_id, record)
            }
            (Target::Created(temp_id), None) => {
                return Err(Error::MissingServerRecord(temp_id.into_string()));
            }
            (Target::Updated(id), Some(record)) => replace_by_id(current, &id, record),
            (Target::Updated(id), None) => confirm_by_id(current, &id),
            (Target::Deleted(id), _) => remove_by_id(Some(current), &id),
        };
        Ok((next, Resolution::Confirmed))
    }

    /// Discard the optimistic effect, yielding the snapshot verbatim.
    pub fn roll_back(self) -> (Vec<Tracked<T>>, Resolution) {
        (self.context.restore(), Resolution::RolledBack)
    }

    /// Undo only this mutation's effect on `current`, keeping whatever other
    /// mutations did to the collection since this one began.
    ///
    /// - create: the temp-id record is removed
    /// - update: the target goes back to its snapshot copy
    /// - delete: the snapshot copy is reinserted after its nearest
    ///   predecessor that is still present
    pub fn roll_back_onto(self, current: &[Tracked<T>]) -> (Vec<Tracked<T>>, Resolution) {
        let previous = self.context.previous_data();
        let next = match &self.target {
            Target::Created(temp_id) => remove_by_id(Some(current), temp_id.as_str()),
            Target::Updated(id) => match find_by_id(previous, id) {
                Some(original) => current
                    .iter()
                    .map(|item| {
                        if item.id() == id.as_str() {
                            original.clone()
                        } else {
                            item.clone()
                        }
                    })
                    .collect(),
                None => current.to_vec(),
            },
            Target::Deleted(id) => reinsert_removed(current, previous, id),
        };
        (next, Resolution::RolledBack)
    }
}

fn reinsert_removed<T: Entity>(
    current: &[Tracked<T>],
    previous: &[Tracked<T>],
    id: &str,
) -> Vec<Tracked<T>> {
    let Some(index) = previous.iter().position(|item| item.id() == id) else {
        return current.to_vec();
    };
    if find_by_id(current, id).is_some() {
        return current.to_vec();
    }

    let insert_at = previous[..index]
        .iter()
        .rev()
        .find_map(|before| current.iter().position(|item| item.id() == before.id()))
        .map_or(0, |position| position + 1);

    let mut next = current.to_vec();
    next.insert(insert_at, previous[index].clone());
    next
}
