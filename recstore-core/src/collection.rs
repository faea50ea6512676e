//! Collection handles for record operations.
//!
//! A collection handle borrows a backend and scopes every operation to one
//! named collection. Two axes of variants exist:
//!
//! - [`Collection`] / [`TypedCollection`] - statically dispatched over a
//!   concrete backend type
//! - [`DynCollection`] / [`DynTypedCollection`] - dynamically dispatched over
//!   a [`DynStorageBackend`] trait object
//!
//! The typed variants serialize and deserialize a concrete [`Record`] type
//! and run its [`validate`](Record::validate) hook before every write; the
//! untyped variants deal in raw JSON objects.
//!
//! # Example
//!
//! ```ignore
//! # async fn example(registry: &recstore_core::registry::Registry<impl recstore_core::backend::StorageBackend>) -> recstore_core::error::RegistryResult<()> {
//! let persons = registry.typed_collection::<Person>();
//! let id = persons.add(Person { id: 0, first_name: "a".into() }).await?;
//! let stored = persons.get(id).await?;
//! # Ok(()) }
//! ```

use serde_json::{Map, Value};
use std::marker::PhantomData;

use crate::{
    backend::{DynStorageBackend, StorageBackend},
    error::RegistryResult,
    page::Page,
    query::Query,
    record::{Record, RecordExt},
};

/// An untyped collection handle over a statically known backend.
///
/// Payloads are raw JSON objects; no validation beyond the backend's
/// object-shape check is applied.
#[derive(Debug)]
pub struct Collection<'a, B: StorageBackend> {
    name: String,
    backend: &'a B,
}

impl<'a, B: StorageBackend> Collection<'a, B> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a record and returns its assigned id.
    pub async fn add(&self, record: Value) -> RegistryResult<u64> {
        self.backend.insert(record, &self.name).await
    }

    /// Adds a record under a caller-supplied id; fails with
    /// [`Conflict`](crate::error::RegistryError::Conflict) if the id is taken.
    pub async fn add_with_id(&self, id: u64, record: Value) -> RegistryResult<()> {
        self.backend
            .insert_with_id(id, record, &self.name)
            .await
    }

    /// Retrieves a record by id.
    pub async fn get(&self, id: u64) -> RegistryResult<Value> {
        self.backend.fetch(id, &self.name).await
    }

    /// Replaces all fields of a record except its id.
    pub async fn update(&self, id: u64, record: Value) -> RegistryResult<Value> {
        self.backend
            .replace(id, record, &self.name)
            .await
    }

    /// Merges only the supplied fields into a record.
    pub async fn patch(&self, id: u64, fields: Map<String, Value>) -> RegistryResult<Value> {
        self.backend
            .merge(id, fields, &self.name)
            .await
    }

    /// Deletes a record by id.
    pub async fn remove(&self, id: u64) -> RegistryResult<()> {
        self.backend.delete(id, &self.name).await
    }

    /// Lists records matching a query (filter, then sort, then paginate).
    pub async fn list(&self, query: Query) -> RegistryResult<Page<Value>> {
        self.backend.search(query, &self.name).await
    }

    /// Returns the number of records in this collection.
    pub async fn count(&self) -> RegistryResult<usize> {
        self.backend.count(&self.name).await
    }
}

/// A typed collection handle over a statically known backend.
///
/// Converts between the record type `R` and its stored JSON form on every
/// call, and runs [`Record::validate`] before writes.
#[derive(Debug)]
pub struct TypedCollection<'a, B: StorageBackend, R: Record> {
    name: String,
    backend: &'a B,
    _marker: PhantomData<R>,
}

impl<'a, B: StorageBackend, R: Record> TypedCollection<'a, B, R> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a record and returns its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`Validation`](crate::error::RegistryError::Validation) if the record fails
    /// its own [`validate`](Record::validate) check.
    pub async fn add(&self, record: R) -> RegistryResult<u64> {
        record.validate()?;

        self.backend
            .insert(record.to_json()?, &self.name)
            .await
    }

    /// Adds a record under a caller-supplied id; fails with
    /// [`Conflict`](crate::error::RegistryError::Conflict) if the id is taken.
    pub async fn add_with_id(&self, id: u64, record: R) -> RegistryResult<()> {
        record.validate()?;

        self.backend
            .insert_with_id(id, record.to_json()?, &self.name)
            .await
    }

    /// Retrieves a record by id, with its assigned id filled in.
    pub async fn get(&self, id: u64) -> RegistryResult<R> {
        R::from_json(self.backend.fetch(id, &self.name).await?)
    }

    /// Replaces all fields of a record except its id, returning the stored
    /// result.
    pub async fn update(&self, id: u64, record: R) -> RegistryResult<R> {
        record.validate()?;

        R::from_json(
            self.backend
                .replace(id, record.to_json()?, &self.name)
                .await?,
        )
    }

    /// Merges only the supplied fields into a record, returning the stored
    /// result. Partial input has no typed shape, so fields are given as a
    /// JSON map.
    pub async fn patch(&self, id: u64, fields: Map<String, Value>) -> RegistryResult<R> {
        R::from_json(
            self.backend
                .merge(id, fields, &self.name)
                .await?,
        )
    }

    /// Deletes a record by id.
    pub async fn remove(&self, id: u64) -> RegistryResult<()> {
        self.backend.delete(id, &self.name).await
    }

    /// Lists records matching a query (filter, then sort, then paginate).
    pub async fn list(&self, query: Query) -> RegistryResult<Page<R>> {
        let page = self.backend.search(query, &self.name).await?;

        let items = page
            .items
            .iter()
            .cloned()
            .map(R::from_json)
            .collect::<RegistryResult<Vec<R>>>()?;

        Ok(Page {
            items,
            total: page.total,
            offset: page.offset,
            limit: page.limit,
        })
    }

    /// Returns the number of records in this collection.
    pub async fn count(&self) -> RegistryResult<usize> {
        self.backend.count(&self.name).await
    }
}

/// An untyped collection handle over a backend trait object.
#[derive(Debug)]
pub struct DynCollection<'a> {
    name: String,
    backend: &'a dyn DynStorageBackend,
}

impl<'a> DynCollection<'a> {
    pub(crate) fn new(name: String, backend: &'a dyn DynStorageBackend) -> Self {
        Self { name, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a record and returns its assigned id.
    pub async fn add(&self, record: Value) -> RegistryResult<u64> {
        self.backend.insert(record, &self.name).await
    }

    /// Adds a record under a caller-supplied id; fails with
    /// [`Conflict`](crate::error::RegistryError::Conflict) if the id is taken.
    pub async fn add_with_id(&self, id: u64, record: Value) -> RegistryResult<()> {
        self.backend
            .insert_with_id(id, record, &self.name)
            .await
    }

    /// Retrieves a record by id.
    pub async fn get(&self, id: u64) -> RegistryResult<Value> {
        self.backend.fetch(id, &self.name).await
    }

    /// Replaces all fields of a record except its id.
    pub async fn update(&self, id: u64, record: Value) -> RegistryResult<Value> {
        self.backend
            .replace(id, record, &self.name)
            .await
    }

    /// Merges only the supplied fields into a record.
    pub async fn patch(&self, id: u64, fields: Map<String, Value>) -> RegistryResult<Value> {
        self.backend
            .merge(id, fields, &self.name)
            .await
    }

    /// Deletes a record by id.
    pub async fn remove(&self, id: u64) -> RegistryResult<()> {
        self.backend.delete(id, &self.name).await
    }

    /// Lists records matching a query (filter, then sort, then paginate).
    pub async fn list(&self, query: Query) -> RegistryResult<Page<Value>> {
        self.backend.search(query, &self.name).await
    }

    /// Returns the number of records in this collection.
    pub async fn count(&self) -> RegistryResult<usize> {
        self.backend.count(&self.name).await
    }
}

/// A typed collection handle over a backend trait object.
#[derive(Debug)]
pub struct DynTypedCollection<'a, R: Record> {
    name: String,
    backend: &'a dyn DynStorageBackend,
    _marker: PhantomData<R>,
}

impl<'a, R: Record> DynTypedCollection<'a, R> {
    pub(crate) fn new(name: String, backend: &'a dyn DynStorageBackend) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a record and returns its assigned id.
    pub async fn add(&self, record: R) -> RegistryResult<u64> {
        record.validate()?;

        self.backend
            .insert(record.to_json()?, &self.name)
            .await
    }

    /// Adds a record under a caller-supplied id; fails with
    /// [`Conflict`](crate::error::RegistryError::Conflict) if the id is taken.
    pub async fn add_with_id(&self, id: u64, record: R) -> RegistryResult<()> {
        record.validate()?;

        self.backend
            .insert_with_id(id, record.to_json()?, &self.name)
            .await
    }

    /// Retrieves a record by id, with its assigned id filled in.
    pub async fn get(&self, id: u64) -> RegistryResult<R> {
        R::from_json(self.backend.fetch(id, &self.name).await?)
    }

    /// Replaces all fields of a record except its id, returning the stored
    /// result.
    pub async fn update(&self, id: u64, record: R) -> RegistryResult<R> {
        record.validate()?;

        R::from_json(
            self.backend
                .replace(id, record.to_json()?, &self.name)
                .await?,
        )
    }

    /// Merges only the supplied fields into a record, returning the stored
    /// result.
    pub async fn patch(&self, id: u64, fields: Map<String, Value>) -> RegistryResult<R> {
        R::from_json(
            self.backend
                .merge(id, fields, &self.name)
                .await?,
        )
    }

    /// Deletes a record by id.
    pub async fn remove(&self, id: u64) -> RegistryResult<()> {
        self.backend.delete(id, &self.name).await
    }

    /// Lists records matching a query (filter, then sort, then paginate).
    pub async fn list(&self, query: Query) -> RegistryResult<Page<R>> {
        let page = self.backend.search(query, &self.name).await?;

        let items = page
            .items
            .iter()
            .cloned()
            .map(R::from_json)
            .collect::<RegistryResult<Vec<R>>>()?;

        Ok(Page {
            items,
            total: page.total,
            offset: page.offset,
            limit: page.limit,
        })
    }

    /// Returns the number of records in this collection.
    pub async fn count(&self) -> RegistryResult<usize> {
        self.backend.count(&self.name).await
    }
}
