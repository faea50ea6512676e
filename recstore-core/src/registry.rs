//! Registry front types tying a backend to its collection handles.
//!
//! A registry owns (or borrows) a storage backend and hands out collection
//! handles scoped to it. Three variants cover the usual ownership shapes:
//!
//! - [`Registry`] - statically typed over a concrete backend
//! - [`DynRegistry`] - owns a boxed backend trait object
//! - [`DynRegistryRef`] - borrows a backend trait object
//!
//! There is deliberately no global instance anywhere: a registry is an
//! explicitly constructed value, passed by parameter into whatever serves it
//! (an HTTP layer, a test), so every consumer gets isolated state when it
//! wants it.
//!
//! # Example
//!
//! ```ignore
//! let registry = Registry::new(backend);
//! let persons = registry.typed_collection::<Person>();
//! ```

use crate::{
    backend::{DynStorageBackend, StorageBackend},
    collection::{Collection, DynCollection, DynTypedCollection, TypedCollection},
    error::RegistryResult,
    record::Record,
};

/// A strongly-typed registry bound to a specific backend implementation.
#[derive(Debug)]
pub struct Registry<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> Registry<B> {
    /// Creates a new registry over the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Gets a typed collection handle for the given record type.
    ///
    /// The collection name comes from the record type's
    /// [`collection_name`](Record::collection_name).
    pub fn typed_collection<'a, R: Record>(&'a self) -> TypedCollection<'a, B, R> {
        TypedCollection::new(R::collection_name().to_string(), &self.backend)
    }

    /// Gets an untyped collection handle with the given name.
    pub fn collection<'a>(&'a self, name: &str) -> Collection<'a, B> {
        Collection::new(name.to_string(), &self.backend)
    }

    /// Creates an empty collection with the given name.
    pub async fn create_collection(&self, name: &str) -> RegistryResult<()> {
        self.backend.create_collection(name).await
    }

    /// Drops a collection and all its records.
    pub async fn drop_collection(&self, name: &str) -> RegistryResult<()> {
        self.backend.drop_collection(name).await
    }

    /// Lists all collections in the store.
    pub async fn list_collections(&self) -> RegistryResult<Vec<String>> {
        self.backend.list_collections().await
    }

    /// Shuts down the registry, releasing backend resources.
    pub async fn shutdown(self) -> RegistryResult<()> {
        self.backend.shutdown().await
    }
}

/// A registry owning a boxed backend trait object.
///
/// Use this when the backend implementation is chosen at runtime.
#[derive(Debug)]
pub struct DynRegistry {
    backend: Box<dyn DynStorageBackend>,
}

impl DynRegistry {
    /// Creates a new dynamic registry over the given boxed backend.
    pub fn new(backend: Box<dyn DynStorageBackend>) -> Self {
        Self { backend }
    }

    /// Gets a typed collection handle for the given record type.
    pub fn typed_collection<'a, R: Record>(&'a self) -> DynTypedCollection<'a, R> {
        DynTypedCollection::new(R::collection_name().to_string(), &*self.backend)
    }

    /// Gets an untyped collection handle with the given name.
    pub fn collection<'a>(&'a self, name: &str) -> DynCollection<'a> {
        DynCollection::new(name.to_string(), &*self.backend)
    }

    /// Creates an empty collection with the given name.
    pub async fn create_collection(&self, name: &str) -> RegistryResult<()> {
        self.backend.create_collection(name).await
    }

    /// Drops a collection and all its records.
    pub async fn drop_collection(&self, name: &str) -> RegistryResult<()> {
        self.backend.drop_collection(name).await
    }

    /// Lists all collections in the store.
    pub async fn list_collections(&self) -> RegistryResult<Vec<String>> {
        self.backend.list_collections().await
    }

    /// Shuts down the registry, releasing backend resources.
    pub async fn shutdown(self) -> RegistryResult<()> {
        self.backend.shutdown_boxed().await
    }
}

/// A registry borrowing a backend trait object.
#[derive(Debug)]
pub struct DynRegistryRef<'a> {
    backend: &'a dyn DynStorageBackend,
}

impl<'a> DynRegistryRef<'a> {
    /// Creates a registry reference over the given backend.
    pub fn new(backend: &'a dyn DynStorageBackend) -> Self {
        Self { backend }
    }

    /// Gets a typed collection handle for the given record type.
    pub fn typed_collection<R: Record>(&'a self) -> DynTypedCollection<'a, R> {
        DynTypedCollection::new(R::collection_name().to_string(), self.backend)
    }

    /// Gets an untyped collection handle with the given name.
    pub fn collection(&'a self, name: &str) -> DynCollection<'a> {
        DynCollection::new(name.to_string(), self.backend)
    }

    /// Creates an empty collection with the given name.
    pub async fn create_collection(&self, name: &str) -> RegistryResult<()> {
        self.backend.create_collection(name).await
    }

    /// Drops a collection and all its records.
    pub async fn drop_collection(&self, name: &str) -> RegistryResult<()> {
        self.backend.drop_collection(name).await
    }

    /// Lists all collections in the store.
    pub async fn list_collections(&self) -> RegistryResult<Vec<String>> {
        self.backend.list_collections().await
    }
}

/// Conversion trait for viewing a registry through a dynamic reference.
pub trait AsDynRegistry {
    /// Borrows this registry as a dynamic reference.
    fn as_dyn<'a>(&'a self) -> DynRegistryRef<'a>;
}

/// Conversion trait for turning a registry into a dynamic owned registry.
pub trait IntoDynRegistry {
    /// Converts this registry into a dynamic owned registry.
    fn into_dyn(self) -> DynRegistry;
}

impl<B: StorageBackend + 'static> AsDynRegistry for Registry<B> {
    fn as_dyn<'a>(&'a self) -> DynRegistryRef<'a> {
        DynRegistryRef::new(&self.backend)
    }
}

impl AsDynRegistry for DynRegistry {
    fn as_dyn<'a>(&'a self) -> DynRegistryRef<'a> {
        DynRegistryRef::new(&*self.backend)
    }
}

impl<'a> AsDynRegistry for DynRegistryRef<'a> {
    fn as_dyn<'b>(&'b self) -> DynRegistryRef<'b> {
        DynRegistryRef::new(self.backend)
    }
}

impl<B: StorageBackend + 'static> IntoDynRegistry for Registry<B> {
    fn into_dyn(self) -> DynRegistry {
        DynRegistry::new(Box::new(self.backend))
    }
}

impl IntoDynRegistry for DynRegistry {
    fn into_dyn(self) -> DynRegistry {
        self
    }
}

/// Conversion trait for recovering a statically-typed view from a dynamic
/// registry, when the concrete backend type is known to the caller.
pub trait AsStaticRegistry {
    /// Downcasts to a borrowed statically-typed registry, or `None` if the
    /// backend is of a different type.
    fn as_static<'a, B>(&'a self) -> Option<Registry<&'a B>>
    where
        B: StorageBackend + 'static;
}

/// Conversion trait for recovering an owned statically-typed registry from a
/// dynamic one.
pub trait IntoStaticRegistry {
    /// Downcasts into an owned statically-typed registry, or `None` if the
    /// backend is of a different type.
    fn into_static<B>(self) -> Option<Registry<B>>
    where
        B: StorageBackend + 'static;
}

impl AsStaticRegistry for DynRegistry {
    fn as_static<'a, B>(&'a self) -> Option<Registry<&'a B>>
    where
        B: StorageBackend + 'static,
    {
        self.backend
            .as_any()
            .downcast_ref::<B>()
            .map(Registry::new)
    }
}

impl<'a> AsStaticRegistry for DynRegistryRef<'a> {
    fn as_static<'b, B>(&'b self) -> Option<Registry<&'b B>>
    where
        B: StorageBackend + 'static,
    {
        self.backend
            .as_any()
            .downcast_ref::<B>()
            .map(Registry::new)
    }
}

impl IntoStaticRegistry for DynRegistry {
    fn into_static<B>(self) -> Option<Registry<B>>
    where
        B: StorageBackend + 'static,
    {
        self.backend
            .into_any()
            .downcast::<B>()
            .ok()
            .map(|b| Registry::new(*b))
    }
}
