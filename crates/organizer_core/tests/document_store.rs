//! Contract checks shared by every `DocumentStore` implementation.

use organizer_core::{
    Collection, Document, DocumentStore, FieldEquals, InMemoryDocumentStore, SqliteDocumentStore,
    StoreError,
};
use serde_json::json;

fn document(value: serde_json::Value) -> Document {
    value.as_object().cloned().unwrap()
}

async fn insert_then_get_roundtrip(store: &impl DocumentStore) {
    let id = store
        .insert(Collection::Events, document(json!({ "title": "Standup" })))
        .await
        .unwrap();

    let loaded = store.get_by_id(Collection::Events, &id).await.unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.fields.get("title"), Some(&json!("Standup")));

    assert!(store
        .get_by_id(Collection::Favorites, &id)
        .await
        .unwrap()
        .is_none());
    assert!(store
        .get_by_id(Collection::Events, "missing")
        .await
        .unwrap()
        .is_none());
}

async fn collections_are_isolated(store: &impl DocumentStore) {
    store
        .insert(Collection::Events, document(json!({ "title": "a" })))
        .await
        .unwrap();
    store
        .insert(Collection::Events, document(json!({ "title": "b" })))
        .await
        .unwrap();
    store
        .insert(Collection::Favorites, document(json!({ "userId": "u" })))
        .await
        .unwrap();

    assert_eq!(store.get_all(Collection::Events).await.unwrap().len(), 2);
    assert_eq!(store.get_all(Collection::Favorites).await.unwrap().len(), 1);
}

async fn update_merges_top_level_keys(store: &impl DocumentStore) {
    let id = store
        .insert(
            Collection::Events,
            document(json!({ "title": "old", "creatorId": "alice" })),
        )
        .await
        .unwrap();

    store
        .update_by_id(
            Collection::Events,
            &id,
            document(json!({ "title": "new", "date": "2024-02-01" })),
        )
        .await
        .unwrap();

    let loaded = store.get_by_id(Collection::Events, &id).await.unwrap().unwrap();
    assert_eq!(
        loaded.fields,
        document(json!({ "title": "new", "creatorId": "alice", "date": "2024-02-01" }))
    );

    let err = store
        .update_by_id(Collection::Events, "missing", Document::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::DocumentNotFound {
            collection: Collection::Events,
            ..
        }
    ));
}

async fn delete_reports_whether_anything_was_removed(store: &impl DocumentStore) {
    let id = store
        .insert(Collection::Favorites, document(json!({ "userId": "u" })))
        .await
        .unwrap();

    assert!(!store.delete_by_id(Collection::Events, &id).await.unwrap());
    assert!(store.delete_by_id(Collection::Favorites, &id).await.unwrap());
    assert!(!store.delete_by_id(Collection::Favorites, &id).await.unwrap());
    assert!(store.get_all(Collection::Favorites).await.unwrap().is_empty());
}

async fn scan_matches_all_string_filters(store: &impl DocumentStore) {
    for (user, event) in [("u1", "e1"), ("u1", "e2"), ("u2", "e1")] {
        store
            .insert(
                Collection::Favorites,
                document(json!({ "userId": user, "eventId": event })),
            )
            .await
            .unwrap();
    }
    store
        .insert(
            Collection::Favorites,
            document(json!({ "userId": 1, "eventId": "e1" })),
        )
        .await
        .unwrap();

    let by_user = store
        .scan_where(Collection::Favorites, &[FieldEquals::new("userId", "u1")])
        .await
        .unwrap();
    assert_eq!(by_user.len(), 2);

    let pair = store
        .scan_where(
            Collection::Favorites,
            &[
                FieldEquals::new("userId", "u1"),
                FieldEquals::new("eventId", "e1"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(pair.len(), 1);
    assert_eq!(pair[0].fields.get("eventId"), Some(&json!("e1")));

    let numeric = store
        .scan_where(Collection::Favorites, &[FieldEquals::new("userId", "1")])
        .await
        .unwrap();
    assert!(numeric.is_empty());

    let everything = store.scan_where(Collection::Favorites, &[]).await.unwrap();
    assert_eq!(everything.len(), 4);

    let err = store
        .scan_where(
            Collection::Favorites,
            &[FieldEquals::new("userId') OR 1=1 --", "u1")],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidField(_)));
}

macro_rules! store_contract {
    ($module:ident, $make:expr) => {
        mod $module {
            use super::*;

            #[tokio::test]
            async fn insert_then_get() {
                insert_then_get_roundtrip(&$make).await;
            }

            #[tokio::test]
            async fn isolation() {
                collections_are_isolated(&$make).await;
            }

            #[tokio::test]
            async fn update_merge() {
                update_merges_top_level_keys(&$make).await;
            }

            #[tokio::test]
            async fn delete_result() {
                delete_reports_whether_anything_was_removed(&$make).await;
            }

            #[tokio::test]
            async fn scan_filters() {
                scan_matches_all_string_filters(&$make).await;
            }
        }
    };
}

store_contract!(memory, InMemoryDocumentStore::new());
store_contract!(sqlite, SqliteDocumentStore::open_in_memory().unwrap());

#[tokio::test]
async fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("organizer.db");

    let id = {
        let store = SqliteDocumentStore::open(&path).unwrap();
        store
            .insert(Collection::Events, document(json!({ "title": "kept" })))
            .await
            .unwrap()
    };

    let reopened = SqliteDocumentStore::open(&path).unwrap();
    let loaded = reopened
        .get_by_id(Collection::Events, &id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.fields.get("title"), Some(&json!("kept")));
}
