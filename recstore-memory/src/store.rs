//! Thread-safe in-memory implementation of the storage backend.
//!
//! Records live in per-collection `BTreeMap`s behind a single async-aware
//! read-write lock. Because ids are assigned from a forward-only counter,
//! ordered iteration over the map *is* insertion order, and deleted ids are
//! never handed out again.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use mea::rwlock::RwLock;
use serde_json::{Map, Value};
use tracing::debug;

use recstore_core::{
    backend::{StorageBackend, StorageBackendBuilder},
    error::{RegistryError, RegistryResult},
    page::{Page, PageLimits},
    query::{Query, SortDirection},
};

use crate::evaluator::{ExprEvaluator, sort_key};

/// One collection's records plus its id cursor.
#[derive(Default, Debug)]
struct CollectionState {
    /// Stored records keyed by assigned id. Ids are monotonic, so ordered
    /// iteration equals insertion order.
    records: BTreeMap<u64, Value>,
    /// Highest id ever assigned in this collection. Only moves forward,
    /// including across deletes, so ids are never reused.
    last_id: u64,
}

impl CollectionState {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// Records a caller-supplied id so later assignments stay unique.
    fn claim_id(&mut self, id: u64) {
        self.last_id = self.last_id.max(id);
    }
}

type Collections = HashMap<String, CollectionState>;

/// Thread-safe in-memory record storage backend.
///
/// `InMemoryBackend` is cloneable; clones share the same underlying state, so
/// one instance can serve any number of concurrent tasks. Every mutation
/// takes the write lock for the duration of a single-record operation only,
/// which makes id assignment linearizable and keeps readers from ever
/// observing a partially written record.
///
/// # Performance
///
/// `fetch`/`delete` are O(log n) map operations; `search` scans the whole
/// collection (no indexing). For the small working sets this backend targets
/// that is the right trade.
///
/// # Example
///
/// ```ignore
/// use recstore_memory::InMemoryBackend;
/// use recstore_core::backend::StorageBackend;
/// use serde_json::json;
///
/// # async fn example() -> recstore_core::error::RegistryResult<()> {
/// let backend = InMemoryBackend::new();
///
/// let id = backend.insert(json!({"first_name": "a"}), "persons").await?;
/// let stored = backend.fetch(id, "persons").await?;
/// assert_eq!(stored["first_name"], "a");
/// # Ok(()) }
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryBackend {
    /// collection name -> (id -> stored record)
    collections: Arc<RwLock<Collections>>,
    limits: PageLimits,
}

impl InMemoryBackend {
    /// Creates a new empty backend with default page limits (10/100).
    pub fn new() -> Self {
        Self::with_limits(PageLimits::default())
    }

    /// Creates a new empty backend with the given page limits.
    pub fn with_limits(limits: PageLimits) -> Self {
        Self {
            collections: Arc::new(RwLock::new(Collections::new())),
            limits,
        }
    }

    /// Creates a builder for constructing a backend with custom options.
    pub fn builder() -> InMemoryBackendBuilder {
        InMemoryBackendBuilder::default()
    }

    /// The page limits this backend clamps list requests against.
    pub fn limits(&self) -> PageLimits {
        self.limits
    }
}

/// Validates that a payload is a JSON object and strips any caller-supplied
/// `"id"` field; the store's assignment is authoritative.
fn as_fields(record: Value) -> RegistryResult<Map<String, Value>> {
    match record {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        _ => Err(RegistryError::Validation(
            "record payload must be a JSON object".to_string(),
        )),
    }
}

fn stored(id: u64, mut fields: Map<String, Value>) -> Value {
    fields.insert("id".to_string(), Value::from(id));
    Value::Object(fields)
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn insert(&self, record: Value, collection: &str) -> RegistryResult<u64> {
        let fields = as_fields(record)?;

        let mut collections = self.collections.write().await;
        let state = collections
            .entry(collection.to_string())
            .or_default();

        let id = state.next_id();
        state.records.insert(id, stored(id, fields));

        debug!(collection, id, "added record");
        Ok(id)
    }

    async fn insert_with_id(
        &self,
        id: u64,
        record: Value,
        collection: &str,
    ) -> RegistryResult<()> {
        let fields = as_fields(record)?;

        let mut collections = self.collections.write().await;
        let state = collections
            .entry(collection.to_string())
            .or_default();

        if state.records.contains_key(&id) {
            return Err(RegistryError::Conflict(id, collection.to_string()));
        }

        state.records.insert(id, stored(id, fields));
        state.claim_id(id);

        debug!(collection, id, "added record with explicit id");
        Ok(())
    }

    async fn fetch(&self, id: u64, collection: &str) -> RegistryResult<Value> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|state| state.records.get(&id))
            .cloned()
            .ok_or_else(|| RegistryError::RecordNotFound(id, collection.to_string()))
    }

    async fn replace(&self, id: u64, record: Value, collection: &str) -> RegistryResult<Value> {
        let fields = as_fields(record)?;

        let mut collections = self.collections.write().await;
        let slot = collections
            .get_mut(collection)
            .and_then(|state| state.records.get_mut(&id))
            .ok_or_else(|| RegistryError::RecordNotFound(id, collection.to_string()))?;

        *slot = stored(id, fields);

        debug!(collection, id, "replaced record");
        Ok(slot.clone())
    }

    async fn merge(
        &self,
        id: u64,
        fields: Map<String, Value>,
        collection: &str,
    ) -> RegistryResult<Value> {
        let mut collections = self.collections.write().await;
        let slot = collections
            .get_mut(collection)
            .and_then(|state| state.records.get_mut(&id))
            .ok_or_else(|| RegistryError::RecordNotFound(id, collection.to_string()))?;

        if let Some(object) = slot.as_object_mut() {
            for (key, value) in fields {
                // The assigned id never changes, not even through a merge.
                if key != "id" {
                    object.insert(key, value);
                }
            }
        }

        debug!(collection, id, "merged fields into record");
        Ok(slot.clone())
    }

    async fn delete(&self, id: u64, collection: &str) -> RegistryResult<()> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(collection)
            .and_then(|state| state.records.remove(&id));

        if removed.is_none() {
            return Err(RegistryError::RecordNotFound(id, collection.to_string()));
        }

        debug!(collection, id, "deleted record");
        Ok(())
    }

    async fn search(&self, query: Query, collection: &str) -> RegistryResult<Page<Value>> {
        let collections = self.collections.read().await;
        let Some(state) = collections.get(collection) else {
            return Ok(Page::empty(query.page, &self.limits));
        };

        // Fixed evaluation order: filter, then sort, then slice.
        let mut results = match &query.filter {
            Some(expr) => ExprEvaluator::filter_records(state.records.values(), expr),
            None => state.records.values().cloned().collect(),
        };

        if let Some(sort) = &query.sort {
            // Stable sort keeps insertion order among equal keys.
            results.sort_by(|a, b| {
                let ordering = sort_key(a, &sort.field)
                    .partial_cmp(&sort_key(b, &sort.field))
                    .unwrap_or(Ordering::Equal);

                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        Ok(Page::slice(results, query.page, &self.limits))
    }

    async fn count(&self, collection: &str) -> RegistryResult<usize> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|state| state.records.len())
            .unwrap_or(0))
    }

    async fn create_collection(&self, name: &str) -> RegistryResult<()> {
        self.collections
            .write()
            .await
            .entry(name.to_string())
            .or_default();

        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> RegistryResult<()> {
        let mut collections = self.collections.write().await;

        if collections.remove(name).is_none() {
            return Err(RegistryError::CollectionNotFound(name.to_string()));
        }

        debug!(collection = name, "dropped collection");
        Ok(())
    }

    async fn list_collections(&self) -> RegistryResult<Vec<String>> {
        Ok(self
            .collections
            .read()
            .await
            .keys()
            .cloned()
            .collect())
    }
}

/// Builder for constructing [`InMemoryBackend`] instances.
#[derive(Default)]
pub struct InMemoryBackendBuilder {
    limits: PageLimits,
}

impl InMemoryBackendBuilder {
    /// Overrides the default page limits (10/100).
    pub fn limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }
}

#[async_trait]
impl StorageBackendBuilder for InMemoryBackendBuilder {
    type Backend = InMemoryBackend;

    async fn build(self) -> RegistryResult<Self::Backend> {
        Ok(InMemoryBackend::with_limits(self.limits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recstore_core::query::{Cond, SortDirection};
    use serde_json::json;
    use std::collections::HashSet;

    #[tokio::test]
    async fn ids_start_at_one_and_listing_follows_insertion_order() {
        let backend = InMemoryBackend::new();

        assert_eq!(backend.insert(json!({"first_name": "a"}), "persons").await.unwrap(), 1);
        assert_eq!(backend.insert(json!({"first_name": "b"}), "persons").await.unwrap(), 2);

        let page = backend.search(Query::new(), "persons").await.unwrap();
        assert_eq!(
            page.items,
            vec![
                json!({"first_name": "a", "id": 1}),
                json!({"first_name": "b", "id": 2}),
            ]
        );

        backend.delete(1, "persons").await.unwrap();
        assert!(matches!(
            backend.fetch(1, "persons").await,
            Err(RegistryError::RecordNotFound(1, _))
        ));

        let page = backend.search(Query::new(), "persons").await.unwrap();
        assert_eq!(page.items, vec![json!({"first_name": "b", "id": 2})]);
    }

    #[tokio::test]
    async fn fetch_round_trips_fields_plus_assigned_id() {
        let backend = InMemoryBackend::new();

        let id = backend
            .insert(json!({"message": "hi", "author": "alice"}), "messages")
            .await
            .unwrap();

        let stored = backend.fetch(id, "messages").await.unwrap();
        assert_eq!(stored["message"], "hi");
        assert_eq!(stored["author"], "alice");
        assert_eq!(stored["id"], json!(id));
    }

    #[tokio::test]
    async fn caller_supplied_id_field_is_ignored() {
        let backend = InMemoryBackend::new();

        let id = backend
            .insert(json!({"id": 99, "first_name": "j"}), "persons")
            .await
            .unwrap();

        assert_eq!(id, 1);
        assert_eq!(backend.fetch(1, "persons").await.unwrap()["id"], json!(1));
    }

    #[tokio::test]
    async fn deleted_ids_are_never_reassigned() {
        let backend = InMemoryBackend::new();

        backend.insert(json!({"n": 1}), "items").await.unwrap();
        let second = backend.insert(json!({"n": 2}), "items").await.unwrap();
        backend.delete(second, "items").await.unwrap();

        assert_eq!(backend.insert(json!({"n": 3}), "items").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn explicit_ids_conflict_and_advance_the_counter() {
        let backend = InMemoryBackend::new();

        backend
            .insert_with_id(10, json!({"n": 1}), "items")
            .await
            .unwrap();
        assert!(matches!(
            backend.insert_with_id(10, json!({"n": 2}), "items").await,
            Err(RegistryError::Conflict(10, _))
        ));

        assert_eq!(backend.insert(json!({"n": 3}), "items").await.unwrap(), 11);
    }

    #[tokio::test]
    async fn replace_swaps_all_fields_and_keeps_the_id() {
        let backend = InMemoryBackend::new();

        let id = backend
            .insert(json!({"first_name": "a", "nickname": "ace"}), "persons")
            .await
            .unwrap();

        let updated = backend
            .replace(id, json!({"first_name": "b"}), "persons")
            .await
            .unwrap();

        assert_eq!(updated, json!({"first_name": "b", "id": id}));
        assert!(updated.get("nickname").is_none());

        assert!(matches!(
            backend.replace(404, json!({"first_name": "x"}), "persons").await,
            Err(RegistryError::RecordNotFound(404, _))
        ));
    }

    #[tokio::test]
    async fn replace_is_idempotent() {
        let backend = InMemoryBackend::new();
        let id = backend.insert(json!({"first_name": "a"}), "persons").await.unwrap();

        let once = backend
            .replace(id, json!({"first_name": "b"}), "persons")
            .await
            .unwrap();
        let twice = backend
            .replace(id, json!({"first_name": "b"}), "persons")
            .await
            .unwrap();

        assert_eq!(once, twice);
        assert_eq!(backend.fetch(id, "persons").await.unwrap(), twice);
        assert_eq!(backend.count("persons").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn merge_touches_only_the_supplied_fields() {
        let backend = InMemoryBackend::new();

        let id = backend
            .insert(json!({"message": "hi", "author": "alice"}), "messages")
            .await
            .unwrap();

        let fields = json!({"author": "bob"});
        let patched = backend
            .merge(id, fields.as_object().unwrap().clone(), "messages")
            .await
            .unwrap();

        assert_eq!(patched, json!({"message": "hi", "author": "bob", "id": id}));
    }

    #[tokio::test]
    async fn merge_cannot_move_a_record_to_another_id() {
        let backend = InMemoryBackend::new();
        let id = backend.insert(json!({"n": 1}), "items").await.unwrap();

        let fields = json!({"id": 42, "n": 2});
        let patched = backend
            .merge(id, fields.as_object().unwrap().clone(), "items")
            .await
            .unwrap();

        assert_eq!(patched["id"], json!(id));
        assert!(matches!(
            backend.fetch(42, "items").await,
            Err(RegistryError::RecordNotFound(42, _))
        ));
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found_but_state_converges() {
        let backend = InMemoryBackend::new();
        let id = backend.insert(json!({"n": 1}), "items").await.unwrap();

        backend.delete(id, "items").await.unwrap();
        assert!(matches!(
            backend.delete(id, "items").await,
            Err(RegistryError::RecordNotFound(_, _))
        ));
        assert_eq!(backend.count("items").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn non_object_payloads_are_rejected() {
        let backend = InMemoryBackend::new();

        assert!(matches!(
            backend.insert(json!([1, 2, 3]), "items").await,
            Err(RegistryError::Validation(_))
        ));
        assert!(matches!(
            backend.insert(json!("text"), "items").await,
            Err(RegistryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn listing_applies_the_default_limit() {
        let backend = InMemoryBackend::new();
        for n in 0..15 {
            backend.insert(json!({"n": n}), "items").await.unwrap();
        }

        let page = backend.search(Query::new(), "items").await.unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total, 15);
        assert!(page.has_more());
    }

    #[tokio::test]
    async fn out_of_range_windows_yield_empty_pages() {
        let backend = InMemoryBackend::new();
        for n in 0..3 {
            backend.insert(json!({"n": n}), "items").await.unwrap();
        }

        let page = backend
            .search(Query::builder().offset(5).limit(10).build(), "items")
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn negative_limit_means_default_limit() {
        let backend = InMemoryBackend::new();
        for n in 0..15 {
            backend.insert(json!({"n": n}), "items").await.unwrap();
        }

        let explicit = backend
            .search(Query::builder().limit(-1).build(), "items")
            .await
            .unwrap();
        let implicit = backend.search(Query::new(), "items").await.unwrap();

        assert_eq!(explicit, implicit);
    }

    #[tokio::test]
    async fn filter_sort_then_slice() {
        let backend = InMemoryBackend::new();
        for (name, age) in [("alice", 30), ("bob", 25), ("carol", 35), ("dave", 17)] {
            backend
                .insert(json!({"name": name, "age": age}), "persons")
                .await
                .unwrap();
        }

        let page = backend
            .search(
                Query::builder()
                    .filter(Cond::gte("age", 18))
                    .sort("age", SortDirection::Desc)
                    .limit(2)
                    .build(),
                "persons",
            )
            .await
            .unwrap();

        let names: Vec<_> = page.items.iter().map(|r| r["name"].clone()).collect();
        assert_eq!(names, vec![json!("carol"), json!("alice")]);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn searching_an_unknown_collection_is_not_an_error() {
        let backend = InMemoryBackend::new();

        let page = backend.search(Query::new(), "nothing").await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(backend.count("nothing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn collection_management() {
        let backend = InMemoryBackend::new();

        backend.create_collection("a").await.unwrap();
        backend.create_collection("b").await.unwrap();

        let mut names = backend.list_collections().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);

        backend.drop_collection("a").await.unwrap();
        assert!(matches!(
            backend.drop_collection("a").await,
            Err(RegistryError::CollectionNotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_assign_pairwise_distinct_ids() {
        let backend = InMemoryBackend::new();

        let mut handles = Vec::new();
        for worker in 0..8u64 {
            let backend = backend.clone();
            handles.push(tokio::spawn(async move {
                let mut ids = Vec::new();
                for n in 0..50u64 {
                    let id = backend
                        .insert(json!({"worker": worker, "n": n}), "stress")
                        .await
                        .unwrap();
                    ids.push(id);
                }
                ids
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.await.unwrap() {
                assert!(seen.insert(id), "id {id} was assigned twice");
            }
        }

        assert_eq!(seen.len(), 400);
        assert_eq!(backend.count("stress").await.unwrap(), 400);
    }
}
