//! End-to-end tests driving the registry the way an HTTP-facing consumer
//! would: typed collections over the in-memory backend.

use chrono::{DateTime, TimeZone, Utc};
use recstore::memory::InMemoryBackend;
use recstore::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Person {
    #[serde(default)]
    id: u64,
    first_name: String,
}

impl Person {
    fn named(first_name: &str) -> Self {
        Self { id: 0, first_name: first_name.to_string() }
    }
}

impl Record for Person {
    fn collection_name() -> &'static str {
        "persons"
    }

    fn validate(&self) -> RegistryResult<()> {
        if self.first_name.is_empty() {
            return Err(RegistryError::Validation("first_name must not be empty".into()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Message {
    #[serde(default)]
    id: u64,
    message: String,
    author: String,
    created: DateTime<Utc>,
}

impl Record for Message {
    fn collection_name() -> &'static str {
        "messages"
    }
}

fn message(n: u32, author: &str) -> Message {
    Message {
        id: 0,
        message: format!("message {n}"),
        author: author.to_string(),
        created: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, n).unwrap(),
    }
}

#[tokio::test]
async fn crud_lifecycle_matches_the_http_contract() {
    let registry = Registry::new(InMemoryBackend::new());
    let persons = registry.typed_collection::<Person>();

    // Two adds on an empty store hand out ids 1 and 2.
    assert_eq!(persons.add(Person::named("a")).await.unwrap(), 1);
    assert_eq!(persons.add(Person::named("b")).await.unwrap(), 2);

    let page = persons.list(Query::new()).await.unwrap();
    assert_eq!(
        page.items,
        vec![
            Person { id: 1, first_name: "a".into() },
            Person { id: 2, first_name: "b".into() },
        ]
    );

    persons.remove(1).await.unwrap();
    assert!(matches!(
        persons.get(1).await,
        Err(RegistryError::RecordNotFound(1, _))
    ));

    let page = persons.list(Query::new()).await.unwrap();
    assert_eq!(page.items, vec![Person { id: 2, first_name: "b".into() }]);

    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn get_returns_what_add_stored_plus_the_id() {
    let registry = Registry::new(InMemoryBackend::new());
    let persons = registry.typed_collection::<Person>();

    let id = persons.add(Person::named("carol")).await.unwrap();
    let stored = persons.get(id).await.unwrap();

    assert_eq!(stored, Person { id, first_name: "carol".into() });
}

#[tokio::test]
async fn records_rejected_by_their_own_validation_never_reach_the_store() {
    let registry = Registry::new(InMemoryBackend::new());
    let persons = registry.typed_collection::<Person>();

    assert!(matches!(
        persons.add(Person::named("")).await,
        Err(RegistryError::Validation(_))
    ));
    assert_eq!(persons.count().await.unwrap(), 0);
}

#[tokio::test]
async fn update_replaces_and_is_idempotent() {
    let registry = Registry::new(InMemoryBackend::new());
    let persons = registry.typed_collection::<Person>();

    let id = persons.add(Person::named("a")).await.unwrap();

    let once = persons.update(id, Person::named("z")).await.unwrap();
    let twice = persons.update(id, Person::named("z")).await.unwrap();

    assert_eq!(once, Person { id, first_name: "z".into() });
    assert_eq!(once, twice);
    assert_eq!(persons.get(id).await.unwrap(), twice);
    assert_eq!(persons.count().await.unwrap(), 1);
}

#[tokio::test]
async fn patch_changes_only_the_named_field() {
    let registry = Registry::new(InMemoryBackend::new());
    let messages = registry.typed_collection::<Message>();

    let id = messages.add(message(1, "alice")).await.unwrap();
    let before = messages.get(id).await.unwrap();

    let fields = json!({"author": "bob"});
    let patched = messages
        .patch(id, fields.as_object().unwrap().clone())
        .await
        .unwrap();

    assert_eq!(patched.author, "bob");
    assert_eq!(patched.message, before.message);
    assert_eq!(patched.created, before.created);
    assert_eq!(patched.id, before.id);
}

#[tokio::test]
async fn fixed_size_pages_partition_the_result_set() {
    let registry = Registry::new(InMemoryBackend::new());
    let messages = registry.typed_collection::<Message>();

    for n in 0..23 {
        messages.add(message(n, "alice")).await.unwrap();
    }

    let mut collected = Vec::new();
    let mut offset = 0;
    loop {
        let page = messages
            .list(Query::builder().offset(offset).limit(5).build())
            .await
            .unwrap();
        assert_eq!(page.total, 23);

        let done = !page.has_more();
        collected.extend(page.items.into_iter().map(|m| m.id));
        if done {
            break;
        }
        offset += 5;
    }

    assert_eq!(collected, (1..=23).collect::<Vec<u64>>());
}

#[tokio::test]
async fn filtered_sorted_listing() {
    let registry = Registry::new(InMemoryBackend::new());
    let messages = registry.typed_collection::<Message>();

    for (n, author) in [(1, "alice"), (2, "bob"), (3, "alice"), (4, "alice")] {
        messages.add(message(n, author)).await.unwrap();
    }

    let page = messages
        .list(
            Query::builder()
                .filter(Cond::eq("author", "alice"))
                .sort("created", SortDirection::Desc)
                .build(),
        )
        .await
        .unwrap();

    let texts: Vec<_> = page.items.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(texts, vec!["message 4", "message 3", "message 1"]);
    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn untyped_collections_speak_raw_json() {
    let registry = Registry::new(InMemoryBackend::new());
    let notes = registry.collection("notes");

    let id = notes.add(json!({"text": "first", "pinned": false})).await.unwrap();

    let fields = json!({"pinned": true});
    let patched = notes
        .patch(id, fields.as_object().unwrap().clone())
        .await
        .unwrap();
    assert_eq!(patched, json!({"id": 1, "text": "first", "pinned": true}));

    let page = notes
        .list(Query::builder().filter(Cond::eq("pinned", true)).build())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn a_borrowed_dynamic_view_shares_the_backing_store() {
    let registry = Registry::new(InMemoryBackend::new());
    registry
        .typed_collection::<Person>()
        .add(Person::named("a"))
        .await
        .unwrap();

    let dyn_view = registry.as_dyn();
    let persons = dyn_view.typed_collection::<Person>();
    assert_eq!(persons.count().await.unwrap(), 1);

    persons.add(Person::named("b")).await.unwrap();
    assert_eq!(
        registry.typed_collection::<Person>().count().await.unwrap(),
        2
    );
}

#[tokio::test]
async fn configured_limits_cap_the_page_size() {
    let backend = InMemoryBackend::builder()
        .limits(PageLimits::new(2, 3))
        .build()
        .await
        .unwrap();
    assert_eq!(backend.limits(), PageLimits::new(2, 3));
    let registry = Registry::new(backend);
    let persons = registry.typed_collection::<Person>();

    for name in ["a", "b", "c", "d", "e"] {
        persons.add(Person::named(name)).await.unwrap();
    }

    let default_page = persons.list(Query::new()).await.unwrap();
    assert_eq!(default_page.items.len(), 2);

    let capped = persons
        .list(Query::builder().limit(1000).build())
        .await
        .unwrap();
    assert_eq!(capped.items.len(), 3);
    assert_eq!(capped.total, 5);
}

#[tokio::test]
async fn dynamic_registry_exposes_the_same_surface() {
    let registry = Registry::new(InMemoryBackend::new()).into_dyn();
    let persons = registry.typed_collection::<Person>();

    let id = persons.add(Person::named("a")).await.unwrap();
    assert_eq!(persons.get(id).await.unwrap().first_name, "a");

    // The untyped handle sees the same record, id field included.
    let raw = registry.collection("persons").get(id).await.unwrap();
    assert_eq!(raw, json!({"id": 1, "first_name": "a"}));

    // And the concrete backend can be recovered when its type is known.
    let static_view = registry.as_static::<InMemoryBackend>().unwrap();
    assert_eq!(
        static_view.typed_collection::<Person>().count().await.unwrap(),
        1
    );

    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn separate_registries_are_fully_isolated() {
    let first = Registry::new(InMemoryBackend::new());
    let second = Registry::new(InMemoryBackend::new());

    first
        .typed_collection::<Person>()
        .add(Person::named("a"))
        .await
        .unwrap();

    assert_eq!(second.typed_collection::<Person>().count().await.unwrap(), 0);
    // Ids restart per store instance: no hidden global state.
    assert_eq!(
        second
            .typed_collection::<Person>()
            .add(Person::named("b"))
            .await
            .unwrap(),
        1
    );
}
