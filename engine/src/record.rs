//! Record types held in cached collections.
//!
//! Domain records (batches, sales, customers...) implement [`Entity`]. The
//! cache never stores them bare: each one is wrapped in [`Tracked`], which
//! says whether the record is confirmed by the server or still reflects an
//! unconfirmed local mutation.

use crate::{RecordId, TempId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A schema-defined record with a string id.
///
/// `Draft` is the payload of a record that has no id yet, `Patch` a partial
/// set of field overrides. Applying a patch must never change the id.
pub trait Entity: Clone {
    type Draft;
    type Patch;

    fn id(&self) -> &str;

    /// Build a record from its payload and the id it should carry.
    fn from_draft(id: RecordId, draft: Self::Draft) -> Self;

    /// Merge `patch` into this record; patch fields take precedence.
    fn apply_patch(&mut self, patch: &Self::Patch);
}

/// A record plus its confirmation state.
#[derive(Debug, Clone, PartialEq)]
pub enum Tracked<T> {
    /// Matches what the server last returned
    Confirmed(T),
    /// Reflects a local mutation the server has not confirmed
    Optimistic {
        record: T,
        /// Set while `record`'s id is a temporary id
        temp_id: Option<TempId>,
    },
}

impl<T> Tracked<T> {
    pub fn confirmed(record: T) -> Self {
        Tracked::Confirmed(record)
    }

    pub fn optimistic(record: T, temp_id: Option<TempId>) -> Self {
        Tracked::Optimistic { record, temp_id }
    }

    pub fn record(&self) -> &T {
        match self {
            Tracked::Confirmed(record) => record,
            Tracked::Optimistic { record, .. } => record,
        }
    }

    pub fn into_record(self) -> T {
        match self {
            Tracked::Confirmed(record) => record,
            Tracked::Optimistic { record, .. } => record,
        }
    }

    pub fn is_optimistic(&self) -> bool {
        matches!(self, Tracked::Optimistic { .. })
    }

    pub fn temp_id(&self) -> Option<&TempId> {
        match self {
            Tracked::Confirmed(_) => None,
            Tracked::Optimistic { temp_id, .. } => temp_id.as_ref(),
        }
    }

    /// Drop the optimistic flag and any temp id.
    pub fn confirm(self) -> Self {
        Tracked::Confirmed(self.into_record())
    }
}

impl<T: Entity> Tracked<T> {
    pub fn id(&self) -> &str {
        self.record().id()
    }

    /// Apply `patch` and mark the result optimistic, keeping any temp id.
    pub fn patched(self, patch: &T::Patch) -> Self {
        let (mut record, temp_id) = match self {
            Tracked::Confirmed(record) => (record, None),
            Tracked::Optimistic { record, temp_id } => (record, temp_id),
        };
        record.apply_patch(patch);
        Tracked::Optimistic { record, temp_id }
    }
}

/// Borrowed wire form: the record's own fields plus the tracking flags.
#[derive(Serialize)]
struct WireRef<'a, T> {
    #[serde(flatten)]
    record: &'a T,
    #[serde(rename = "_isOptimistic")]
    is_optimistic: bool,
    #[serde(rename = "_tempId", skip_serializing_if = "Option::is_none")]
    temp_id: Option<&'a TempId>,
}

#[derive(Deserialize)]
struct WireOwned<T> {
    #[serde(flatten)]
    record: T,
    #[serde(rename = "_isOptimistic", default)]
    is_optimistic: bool,
    #[serde(rename = "_tempId", default)]
    temp_id: Option<TempId>,
}

impl<T: Serialize> Serialize for Tracked<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireRef {
            record: self.record(),
            is_optimistic: self.is_optimistic(),
            temp_id: self.temp_id(),
        }
        .serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Tracked<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireOwned::<T>::deserialize(deserializer)?;
        Ok(if wire.is_optimistic {
            Tracked::Optimistic {
                record: wire.record,
                temp_id: wire.temp_id,
            }
        } else {
            Tracked::Confirmed(wire.record)
        })
    }
}

/// An untyped record: an id plus a JSON object of domain fields.
///
/// `fields` never holds an `id` key; every constructor and setter drops it so
/// the flattened wire form carries exactly one id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRecord {
    pub id: RecordId,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl JsonRecord {
    pub fn new(id: impl Into<RecordId>, mut fields: Map<String, Value>) -> Self {
        fields.remove("id");
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a record from a JSON object that carries its own `id`.
    ///
    /// Returns `None` unless `value` is an object with a string `id`.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };
        let Some(Value::String(id)) = fields.remove("id") else {
            return None;
        };
        Some(Self { id, fields })
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        if field != "id" {
            self.fields.insert(field, value);
        }
    }
}

impl Entity for JsonRecord {
    type Draft = Map<String, Value>;
    type Patch = Map<String, Value>;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: RecordId, draft: Self::Draft) -> Self {
        JsonRecord::new(id, draft)
    }

    fn apply_patch(&mut self, patch: &Self::Patch) {
        for (field, value) in patch {
            self.set(field.clone(), value.clone());
        }
    }
}
