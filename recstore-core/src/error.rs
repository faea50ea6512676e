//! Error and result types for registry operations.
//!
//! Every fallible operation in this crate returns [`RegistryResult<T>`]. The
//! error kinds are deliberately coarse: an HTTP-facing consumer maps each
//! variant to exactly one status code (not found, invalid input, conflict),
//! so the store never needs to know anything about the wire.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors raised by a resource registry.
///
/// The registry never catches or retries these internally; they propagate to
/// the immediate caller, which decides the user-visible behavior. Each variant
/// carries the offending id and/or collection so the caller can build a
/// structured response.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Serialization/deserialization failure at the typed record boundary.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The record payload is malformed: not a JSON object, or rejected by
    /// [`Record::validate`](crate::record::Record::validate).
    #[error("Invalid record: {0}")]
    Validation(String),
    /// No record with the given id exists in the collection.
    /// The first argument is the record id, the second is the collection name.
    #[error("Record {0} not found in collection {1}")]
    RecordNotFound(u64, String),
    /// A record with the caller-supplied id already exists in the collection.
    /// The first argument is the record id, the second is the collection name.
    #[error("Record {0} already exists in collection {1}")]
    Conflict(u64, String),
    /// The named collection does not exist in the store.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

impl From<SerdeJsonError> for RegistryError {
    fn from(err: SerdeJsonError) -> Self {
        RegistryError::Serialization(err.to_string())
    }
}
