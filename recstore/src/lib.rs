//! recstore: a thin in-memory resource registry.
//!
//! This crate is the primary entry point for recstore users. It re-exports
//! the core types and the in-memory backend, so a single dependency gives you
//! a working registry.
//!
//! # Features
//!
//! - **Typed records** - Define records with Serde; the store assigns ids
//! - **CRUD + list** - add, get, update (full replace), patch (partial
//!   merge), remove, and filtered/sorted/paginated listing
//! - **Forgiving pagination** - Out-of-range offsets and limits are clamped,
//!   never errors
//! - **Safe concurrency** - Linearizable id assignment under any number of
//!   concurrent callers
//!
//! # Quick Start
//!
//! ```ignore
//! use recstore::prelude::*;
//! use recstore::memory::InMemoryBackend;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Person {
//!     #[serde(default)]
//!     pub id: u64,
//!     pub first_name: String,
//! }
//!
//! impl Record for Person {
//!     fn collection_name() -> &'static str {
//!         "persons"
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> RegistryResult<()> {
//!     let registry = Registry::new(InMemoryBackend::new());
//!     let persons = registry.typed_collection::<Person>();
//!
//!     let id = persons.add(Person { id: 0, first_name: "a".into() }).await?;
//!     let stored = persons.get(id).await?;
//!     assert_eq!(stored.id, 1);
//!
//!     let page = persons.list(Query::new()).await?;
//!     assert_eq!(page.total, 1);
//!
//!     registry.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Dynamic Dispatch
//!
//! When the backend type is only known at runtime, convert a typed
//! [`Registry`](recstore_core::registry::Registry) into a
//! [`DynRegistry`](recstore_core::registry::DynRegistry) with
//! [`into_dyn`](recstore_core::registry::IntoDynRegistry::into_dyn); the
//! collection surface is identical. The `AsStaticRegistry` /
//! `IntoStaticRegistry` traits recover the concrete backend when needed.
//!
//! # Consuming from an HTTP layer
//!
//! The registry is deliberately wire-agnostic: an HTTP-facing consumer maps
//! `add` to `201 Created`, a `RecordNotFound` error to `404`, `Validation`
//! to `400`, and `Conflict` to `409`, and feeds `offset`/`limit` query
//! parameters straight into [`Query`](recstore_core::query::Query); the
//! store clamps them.

pub mod prelude;

pub use recstore_core::{backend, collection, error, page, query, record, registry};

/// In-memory storage backend implementations.
pub mod memory {
    pub use recstore_memory::{InMemoryBackend, InMemoryBackendBuilder};
}
