//! Core of the recstore project: a thin in-memory resource registry with
//! CRUD, filtering, sorting, and clamped offset/limit pagination.
//!
//! This crate defines the storage-neutral pieces:
//!
//! - **Record trait** ([`record`]) - Typed records and JSON conversion
//! - **Backend abstraction** ([`backend`]) - The seam storage implementations plug into
//! - **Query API** ([`query`]) - Filter expressions, sorting, and the visitor walk
//! - **Pagination** ([`page`]) - Clamping page requests and result pages
//! - **Collections** ([`collection`]) - Per-collection operation handles
//! - **Registry** ([`registry`]) - Front types tying a backend to its collections
//! - **Errors** ([`error`]) - The registry error taxonomy
//!
//! Records are JSON objects keyed by a store-assigned `u64` id: unique,
//! monotonically increasing, never reused. The store owns id assignment and
//! mutation ordering; serialization to a wire format and HTTP mapping belong
//! to the consumer.
//!
//! # Example
//!
//! ```ignore
//! use recstore::prelude::*;
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
//! ```

#[allow(unused_extern_crates)]
extern crate self as recstore_core;

pub mod backend;
pub mod collection;
pub mod error;
pub mod page;
pub mod query;
pub mod record;
pub mod registry;
