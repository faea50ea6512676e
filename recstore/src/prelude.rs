//! Convenient re-exports of the most commonly used recstore types.
//!
//! ```ignore
//! use recstore::prelude::*;
//! ```

pub use recstore_core::{
    backend::{DynStorageBackend, StorageBackend, StorageBackendBuilder},
    collection::{Collection, DynCollection, DynTypedCollection, TypedCollection},
    error::{RegistryError, RegistryResult},
    page::{Page, PageLimits, PageRequest},
    query::{Cond, Expr, FieldOp, Query, QueryBuilder, QueryVisitor, Sort, SortDirection},
    record::{Record, RecordExt},
    registry::{
        AsDynRegistry, AsStaticRegistry, DynRegistry, DynRegistryRef, IntoDynRegistry,
        IntoStaticRegistry, Registry,
    },
};
