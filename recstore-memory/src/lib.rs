//! In-memory storage backend for recstore.
//!
//! This crate provides the thread-safe, in-memory implementation of the
//! `StorageBackend` trait: per-collection ordered maps behind an async-aware
//! read-write lock, with store-owned monotonic id assignment.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes behind an async RwLock
//! - **Linearizable id assignment** - Concurrent adds never share an id, and
//!   ids are never reused after deletes
//! - **Full query support** - Filtering, sorting, and clamped pagination
//! - **Insertion-order listing** - Unsorted listings come back in id order
//!
//! # Quick Start
//!
//! ```ignore
//! use recstore::prelude::*;
//! use recstore::memory::InMemoryBackend;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> RegistryResult<()> {
//!     let registry = Registry::new(InMemoryBackend::new());
//!     let persons = registry.collection("persons");
//!
//!     let id = persons.add(json!({"first_name": "a"})).await?;
//!     let stored = persons.get(id).await?;
//!     assert_eq!(stored["id"], json!(1));
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as recstore_memory;

pub mod evaluator;
pub mod store;

pub use store::{InMemoryBackend, InMemoryBackendBuilder};
