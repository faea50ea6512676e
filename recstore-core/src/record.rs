//! Core trait and conversion utilities for typed records.
//!
//! A record is a JSON object living in a named collection. The store owns id
//! assignment, so the trait does not require an id accessor; instead, a typed
//! record that wants to observe its assigned id simply declares an `id: u64`
//! field (with `#[serde(default)]`) and the store fills it on every read.

use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::error::{RegistryError, RegistryResult};

/// Core trait that all typed records stored in a registry must implement.
///
/// The only required item is [`collection_name`](Record::collection_name),
/// which ties the type to the collection it lives in. Records are serialized
/// to JSON objects at the storage boundary; the serialized form must be an
/// object (a mapping of field names to values), which every struct with named
/// fields satisfies.
///
/// # Example
///
/// ```ignore
/// use recstore::prelude::*;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Person {
///     #[serde(default)]
///     pub id: u64,
///     pub first_name: String,
/// }
///
/// impl Record for Person {
///     fn collection_name() -> &'static str {
///         "persons"
///     }
/// }
/// ```
pub trait Record: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the name of the collection this record type belongs to.
    ///
    /// This should be a static, lowercase identifier (e.g., "persons",
    /// "messages"). The collection is created automatically on first write.
    fn collection_name() -> &'static str;

    /// Checks a record before it is written to the store.
    ///
    /// The default implementation accepts everything. Override it to reject
    /// malformed input (e.g., an empty required field) with a
    /// [`RegistryError::Validation`]; typed collections run this before every
    /// `add` and `update`.
    fn validate(&self) -> RegistryResult<()> {
        Ok(())
    }
}

/// Extension trait providing JSON conversion for records.
///
/// Automatically implemented for every [`Record`]. The conversions are used by
/// the typed collection handles; callers working with untyped collections deal
/// in [`Value`] directly and never need this.
pub trait RecordExt: Record {
    /// Converts this record to a JSON value for storage.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] if the record does not serialize
    /// to a JSON object, or [`RegistryError::Serialization`] if serialization
    /// itself fails.
    fn to_json(&self) -> RegistryResult<Value>;

    /// Rebuilds a record from its stored JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Serialization`] if the stored value does not
    /// match the record type.
    fn from_json(value: Value) -> RegistryResult<Self>;
}

impl<R: Record> RecordExt for R {
    fn to_json(&self) -> RegistryResult<Value> {
        let value = to_value(self)?;

        if !value.is_object() {
            return Err(RegistryError::Validation(format!(
                "record for collection {} did not serialize to an object",
                R::collection_name()
            )));
        }

        Ok(value)
    }

    fn from_json(value: Value) -> RegistryResult<Self> {
        Ok(from_value(value)?)
    }
}
