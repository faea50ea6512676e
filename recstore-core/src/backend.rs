//! Storage backend abstraction for the resource registry.
//!
//! The [`StorageBackend`] trait is the seam between the registry's call
//! contract and whatever actually holds the records. Implementations must be
//! thread-safe (`Send + Sync`) and support concurrent callers; the in-memory
//! backend in `recstore-memory` is the reference implementation.
//!
//! Two companion traits round out the module:
//!
//! - [`DynStorageBackend`] - object-safe mirror for dynamic dispatch
//! - [`StorageBackendBuilder`] - factory trait for constructing backends
//!
//! All operations are single-record and atomic: each either fully succeeds or
//! fails with a [`RegistryError`](crate::error::RegistryError), with no
//! partial mutation observable. Id assignment must be linearizable: two
//! concurrent [`insert`](StorageBackend::insert) calls must never be handed
//! the same id.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::{any::Any, fmt::Debug};

use crate::{error::RegistryResult, page::Page, query::Query};

/// Abstract interface for record storage backends.
///
/// Record payloads cross this boundary as JSON objects ([`Value`]); the typed
/// layer above converts to and from concrete record types. Stored records
/// always carry their assigned id as an `"id"` field, and an `"id"` supplied
/// by the caller in a payload is ignored; the backend's assignment is
/// authoritative.
#[async_trait]
pub trait StorageBackend: Send + Sync + Debug {
    /// Inserts a new record, assigning the next id in the collection.
    ///
    /// The collection is created automatically on first use. Returns the
    /// assigned id, which is unique for the lifetime of the store and never
    /// reused even after deletes.
    ///
    /// # Errors
    ///
    /// Returns [`Validation`](crate::error::RegistryError::Validation) if the
    /// payload is not a JSON object.
    async fn insert(&self, record: Value, collection: &str) -> RegistryResult<u64>;

    /// Inserts a record under a caller-supplied id.
    ///
    /// This is the explicit-id mode for callers that own identifier
    /// assignment (e.g. replaying a snapshot). The internal id counter is
    /// advanced past `id` so later [`insert`](StorageBackend::insert) calls
    /// stay unique.
    ///
    /// # Errors
    ///
    /// Returns [`Conflict`](crate::error::RegistryError::Conflict) if a
    /// record with that id already exists.
    async fn insert_with_id(&self, id: u64, record: Value, collection: &str)
    -> RegistryResult<()>;

    /// Retrieves a record by id. O(1) expected.
    ///
    /// # Errors
    ///
    /// Returns [`RecordNotFound`](crate::error::RegistryError::RecordNotFound)
    /// if no record with that id exists.
    async fn fetch(&self, id: u64, collection: &str) -> RegistryResult<Value>;

    /// Replaces all fields of an existing record except its id, returning the
    /// stored result.
    ///
    /// # Errors
    ///
    /// Returns [`RecordNotFound`](crate::error::RegistryError::RecordNotFound)
    /// if no record with that id exists.
    async fn replace(&self, id: u64, record: Value, collection: &str) -> RegistryResult<Value>;

    /// Merges only the supplied fields into an existing record, leaving all
    /// others untouched, and returns the stored result. An `"id"` key in
    /// `fields` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RecordNotFound`](crate::error::RegistryError::RecordNotFound)
    /// if no record with that id exists.
    async fn merge(
        &self,
        id: u64,
        fields: Map<String, Value>,
        collection: &str,
    ) -> RegistryResult<Value>;

    /// Deletes a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`RecordNotFound`](crate::error::RegistryError::RecordNotFound)
    /// if no record with that id exists. The store's state converges either
    /// way, so callers retrying deletes can safely treat that error as
    /// success.
    async fn delete(&self, id: u64, collection: &str) -> RegistryResult<()>;

    /// Lists records matching a query: filter, then sort, then paginate.
    ///
    /// An unknown collection or an offset past the end of the result set
    /// yields an empty page, never an error.
    async fn search(&self, query: Query, collection: &str) -> RegistryResult<Page<Value>>;

    /// Returns the number of records in a collection (0 if it doesn't exist).
    async fn count(&self, collection: &str) -> RegistryResult<usize>;

    /// Creates an empty collection. A no-op if it already exists.
    async fn create_collection(&self, name: &str) -> RegistryResult<()>;

    /// Drops a collection and all its records.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`CollectionNotFound`](crate::error::RegistryError::CollectionNotFound)
    /// if the collection does not exist.
    async fn drop_collection(&self, name: &str) -> RegistryResult<()>;

    /// Lists the names of all collections in the store.
    async fn list_collections(&self) -> RegistryResult<Vec<String>>;

    /// Cleanly shuts down the backend, releasing any resources it holds.
    ///
    /// The default implementation is a no-op; backends with external
    /// resources should override it.
    async fn shutdown(self) -> RegistryResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StorageBackend for &B
where
    B: StorageBackend,
{
    async fn insert(&self, record: Value, collection: &str) -> RegistryResult<u64> {
        (*self).insert(record, collection).await
    }

    async fn insert_with_id(
        &self,
        id: u64,
        record: Value,
        collection: &str,
    ) -> RegistryResult<()> {
        (*self)
            .insert_with_id(id, record, collection)
            .await
    }

    async fn fetch(&self, id: u64, collection: &str) -> RegistryResult<Value> {
        (*self).fetch(id, collection).await
    }

    async fn replace(&self, id: u64, record: Value, collection: &str) -> RegistryResult<Value> {
        (*self)
            .replace(id, record, collection)
            .await
    }

    async fn merge(
        &self,
        id: u64,
        fields: Map<String, Value>,
        collection: &str,
    ) -> RegistryResult<Value> {
        (*self)
            .merge(id, fields, collection)
            .await
    }

    async fn delete(&self, id: u64, collection: &str) -> RegistryResult<()> {
        (*self).delete(id, collection).await
    }

    async fn search(&self, query: Query, collection: &str) -> RegistryResult<Page<Value>> {
        (*self).search(query, collection).await
    }

    async fn count(&self, collection: &str) -> RegistryResult<usize> {
        (*self).count(collection).await
    }

    async fn create_collection(&self, name: &str) -> RegistryResult<()> {
        (*self).create_collection(name).await
    }

    async fn drop_collection(&self, name: &str) -> RegistryResult<()> {
        (*self).drop_collection(name).await
    }

    async fn list_collections(&self) -> RegistryResult<Vec<String>> {
        (*self).list_collections().await
    }
}

/// Object-safe mirror of [`StorageBackend`] for dynamic dispatch.
///
/// Automatically implemented for every `StorageBackend`; use it when the
/// backend type is only known at runtime. The `as_any` family supports
/// downcasting back to the concrete type.
#[async_trait]
pub trait DynStorageBackend: Send + Sync + Debug {
    async fn insert(&self, record: Value, collection: &str) -> RegistryResult<u64>;
    async fn insert_with_id(&self, id: u64, record: Value, collection: &str)
    -> RegistryResult<()>;
    async fn fetch(&self, id: u64, collection: &str) -> RegistryResult<Value>;
    async fn replace(&self, id: u64, record: Value, collection: &str) -> RegistryResult<Value>;
    async fn merge(
        &self,
        id: u64,
        fields: Map<String, Value>,
        collection: &str,
    ) -> RegistryResult<Value>;
    async fn delete(&self, id: u64, collection: &str) -> RegistryResult<()>;
    async fn search(&self, query: Query, collection: &str) -> RegistryResult<Page<Value>>;
    async fn count(&self, collection: &str) -> RegistryResult<usize>;
    async fn create_collection(&self, name: &str) -> RegistryResult<()>;
    async fn drop_collection(&self, name: &str) -> RegistryResult<()>;
    async fn list_collections(&self) -> RegistryResult<Vec<String>>;
    async fn shutdown_boxed(self: Box<Self>) -> RegistryResult<()>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

#[async_trait]
impl<B: StorageBackend + 'static> DynStorageBackend for B {
    async fn insert(&self, record: Value, collection: &str) -> RegistryResult<u64> {
        StorageBackend::insert(self, record, collection).await
    }

    async fn insert_with_id(
        &self,
        id: u64,
        record: Value,
        collection: &str,
    ) -> RegistryResult<()> {
        StorageBackend::insert_with_id(self, id, record, collection).await
    }

    async fn fetch(&self, id: u64, collection: &str) -> RegistryResult<Value> {
        StorageBackend::fetch(self, id, collection).await
    }

    async fn replace(&self, id: u64, record: Value, collection: &str) -> RegistryResult<Value> {
        StorageBackend::replace(self, id, record, collection).await
    }

    async fn merge(
        &self,
        id: u64,
        fields: Map<String, Value>,
        collection: &str,
    ) -> RegistryResult<Value> {
        StorageBackend::merge(self, id, fields, collection).await
    }

    async fn delete(&self, id: u64, collection: &str) -> RegistryResult<()> {
        StorageBackend::delete(self, id, collection).await
    }

    async fn search(&self, query: Query, collection: &str) -> RegistryResult<Page<Value>> {
        StorageBackend::search(self, query, collection).await
    }

    async fn count(&self, collection: &str) -> RegistryResult<usize> {
        StorageBackend::count(self, collection).await
    }

    async fn create_collection(&self, name: &str) -> RegistryResult<()> {
        StorageBackend::create_collection(self, name).await
    }

    async fn drop_collection(&self, name: &str) -> RegistryResult<()> {
        StorageBackend::drop_collection(self, name).await
    }

    async fn list_collections(&self) -> RegistryResult<Vec<String>> {
        StorageBackend::list_collections(self).await
    }

    async fn shutdown_boxed(self: Box<Self>) -> RegistryResult<()> {
        StorageBackend::shutdown(*self).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Factory trait for constructing backend instances.
#[async_trait]
pub trait StorageBackendBuilder {
    type Backend: StorageBackend;

    async fn build(self) -> RegistryResult<Self::Backend>;
}
