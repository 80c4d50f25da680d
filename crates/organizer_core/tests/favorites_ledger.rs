mod common;

use common::{standup, FailOn, FlakyStore};
use organizer_core::{
    AuthError, Collection, DocumentStore, EventFields, EventId, EventRegistry, FavoritesLedger,
    InMemoryDocumentStore, OrganizerError, Session, SqliteDocumentStore, StoreError,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

fn ledger_over<S: DocumentStore>(store: Arc<S>) -> (EventRegistry<S>, FavoritesLedger<S>) {
    let events = EventRegistry::new(Arc::clone(&store));
    let favorites = FavoritesLedger::new(store, events.clone());
    (events, favorites)
}

async fn link_count(store: &impl DocumentStore) -> usize {
    store.get_all(Collection::Favorites).await.unwrap().len()
}

#[tokio::test]
async fn add_is_idempotent() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let (events, favorites) = ledger_over(Arc::clone(&store));
    let alice = Session::signed_in("alice");
    let bob = Session::signed_in("bob");
    let event = events.create(&alice, standup()).await.unwrap();

    let first = favorites.add(&bob, &event.id).await.unwrap();
    assert!(favorites.is_favorited(&bob, &event.id).await.unwrap());
    let second = favorites.add(&bob, &event.id).await.unwrap();
    assert!(favorites.is_favorited(&bob, &event.id).await.unwrap());

    assert_eq!(first, second);
    assert_eq!(link_count(store.as_ref()).await, 1);
    assert!(!favorites.is_favorited(&alice, &event.id).await.unwrap());
}

#[tokio::test]
async fn remove_is_idempotent() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let (_, favorites) = ledger_over(Arc::clone(&store));
    let bob = Session::signed_in("bob");
    let event_id = EventId::from("never-favorited");

    assert_eq!(favorites.remove(&bob, &event_id).await.unwrap(), 0);
    assert!(!favorites.is_favorited(&bob, &event_id).await.unwrap());

    favorites.add(&bob, &event_id).await.unwrap();
    assert_eq!(favorites.remove(&bob, &event_id).await.unwrap(), 1);
    assert_eq!(favorites.remove(&bob, &event_id).await.unwrap(), 0);
    assert!(!favorites.is_favorited(&bob, &event_id).await.unwrap());
}

#[tokio::test]
async fn remove_heals_duplicate_links() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let (_, favorites) = ledger_over(Arc::clone(&store));
    let bob = Session::signed_in("bob");
    let event_id = EventId::from("e1");

    for _ in 0..3 {
        store
            .insert(
                Collection::Favorites,
                json!({ "userId": "bob", "eventId": "e1" })
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
            .await
            .unwrap();
    }

    let existing = favorites.add(&bob, &event_id).await.unwrap();
    assert_eq!(existing.event_id, event_id);
    assert_eq!(link_count(store.as_ref()).await, 3);

    assert_eq!(favorites.remove(&bob, &event_id).await.unwrap(), 3);
    assert_eq!(link_count(store.as_ref()).await, 0);
}

#[tokio::test]
async fn concurrent_adds_converge_after_remove() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let (_, favorites) = ledger_over(Arc::clone(&store));
    let favorites = Arc::new(favorites);
    let bob = Session::signed_in("bob");
    let event_id = EventId::from("e1");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let favorites = Arc::clone(&favorites);
        let bob = bob.clone();
        let event_id = event_id.clone();
        handles.push(tokio::spawn(async move {
            favorites.add(&bob, &event_id).await.map(|link| link.event_id)
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), event_id);
    }

    // Racing adds may or may not have duplicated; either way one remove heals it.
    let links = link_count(store.as_ref()).await;
    assert!((1..=8).contains(&links));
    assert_eq!(favorites.remove(&bob, &event_id).await.unwrap(), links);
    assert!(!favorites.is_favorited(&bob, &event_id).await.unwrap());
}

#[tokio::test]
async fn add_does_not_require_event_to_exist() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let (_, favorites) = ledger_over(store);
    let bob = Session::signed_in("bob");

    let link = favorites.add(&bob, &EventId::from("ghost")).await.unwrap();
    assert_eq!(link.event_id, EventId::from("ghost"));
    assert!(favorites.list_favorite_events(&bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn anonymous_session_is_rejected_everywhere() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let (_, favorites) = ledger_over(store);
    let anonymous = Session::Anonymous;
    let event_id = EventId::from("e1");

    let err = favorites.add(&anonymous, &event_id).await.unwrap_err();
    assert!(matches!(err, OrganizerError::Auth(AuthError::NotSignedIn)));
    let err = favorites.remove(&anonymous, &event_id).await.unwrap_err();
    assert!(matches!(err, OrganizerError::Auth(AuthError::NotSignedIn)));
    let err = favorites.is_favorited(&anonymous, &event_id).await.unwrap_err();
    assert!(matches!(err, OrganizerError::Auth(AuthError::NotSignedIn)));
    let err = favorites.list_favorite_events(&anonymous).await.unwrap_err();
    assert!(matches!(err, OrganizerError::Auth(AuthError::NotSignedIn)));
}

#[tokio::test]
async fn list_excludes_deleted_events_and_other_users_links() {
    let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    let (events, favorites) = ledger_over(Arc::clone(&store));
    let alice = Session::signed_in("alice");
    let bob = Session::signed_in("bob");

    let standup = events.create(&alice, standup()).await.unwrap();
    let retro = events
        .create(&alice, EventFields::new("Retro", "weekly", "2024-01-12"))
        .await
        .unwrap();
    let demo = events
        .create(&alice, EventFields::new("Demo", "sprint demo", "2024-01-19"))
        .await
        .unwrap();

    favorites.add(&bob, &standup.id).await.unwrap();
    favorites.add(&bob, &retro.id).await.unwrap();
    favorites.add(&alice, &demo.id).await.unwrap();

    events.delete(&alice, &retro.id).await.unwrap();

    let listed = favorites.list_favorite_events(&bob).await.unwrap();
    assert_eq!(listed, vec![standup.clone()]);

    let ids = favorites.favorite_event_ids(&bob).await.unwrap();
    assert_eq!(ids, HashSet::from([standup.id.clone(), retro.id.clone()]));
    assert_eq!(link_count(store.as_ref()).await, 3);
}

#[tokio::test]
async fn store_failures_surface_unchanged() {
    let store = Arc::new(FlakyStore::new());
    let (events, favorites) = ledger_over(Arc::clone(&store));
    let alice = Session::signed_in("alice");
    let event = events.create(&alice, standup()).await.unwrap();
    favorites.add(&alice, &event.id).await.unwrap();

    store.fail_on(FailOn::Delete);
    let err = favorites.remove(&alice, &event.id).await.unwrap_err();
    assert!(matches!(err, OrganizerError::Store(StoreError::Unavailable(_))));
    assert!(store.tripped());

    store.fail_on(FailOn::Nothing);
    assert!(favorites.is_favorited(&alice, &event.id).await.unwrap());

    store.fail_on(FailOn::GetAll);
    let err = favorites.list_favorite_events(&alice).await.unwrap_err();
    assert!(matches!(err, OrganizerError::Store(_)));
}

#[tokio::test]
async fn repeated_event_documents_are_listed_once() {
    let store = Arc::new(FlakyStore::new());
    let (events, favorites) = ledger_over(Arc::clone(&store));
    let alice = Session::signed_in("alice");
    let standup = events.create(&alice, standup()).await.unwrap();
    favorites.add(&alice, &standup.id).await.unwrap();
    favorites.add(&alice, &EventId::from("ghost")).await.unwrap();

    store.repeat_get_all(true);
    let listed = favorites.list_favorite_events(&alice).await.unwrap();
    assert_eq!(listed, vec![standup]);
}
