//! Favorites ledger.
//!
//! # Responsibility
//! - Own the user/event favorite relation in the `favorites` collection.
//! - Materialize "favorite events of a user" with a client-side join.
//!
//! # Invariants
//! - `add` returns an existing link instead of creating a second one.
//! - `remove` deletes every link of the pair, healing racing duplicates.
//! - Links to deleted events are skipped on read, never reported as errors.
//! - Links are not checked against the `events` collection on write.

use crate::model::event::{Event, EventId};
use crate::model::favorite::{FavoriteLink, FavoriteLinkId};
use crate::model::user::UserId;
use crate::service::error::OrganizerResult;
use crate::service::event_registry::EventRegistry;
use crate::session::Session;
use crate::store::{
    from_document, to_document, Collection, DocumentStore, FieldEquals, StoreResult,
    StoredDocument,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

const USER_ID_FIELD: &str = "userId";
const EVENT_ID_FIELD: &str = "eventId";

/// Document shape of the `favorites` collection.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FavoriteDocument {
    user_id: UserId,
    event_id: EventId,
}

/// Favorite relation service.
pub struct FavoritesLedger<S: DocumentStore> {
    store: Arc<S>,
    events: EventRegistry<S>,
}

impl<S: DocumentStore> FavoritesLedger<S> {
    /// Creates a ledger that joins against `events` for reads.
    pub fn new(store: Arc<S>, events: EventRegistry<S>) -> Self {
        Self { store, events }
    }

    pub async fn is_favorited(&self, session: &Session, event_id: &EventId) -> OrganizerResult<bool> {
        let user_id = session.require_user()?;
        Ok(!self.links_for(user_id, event_id).await?.is_empty())
    }

    /// Marks an event as favorite. Idempotent.
    pub async fn add(&self, session: &Session, event_id: &EventId) -> OrganizerResult<FavoriteLink> {
        let user_id = session.require_user()?;
        let mut existing = self.links_for(user_id, event_id).await?;
        if !existing.is_empty() {
            if existing.len() > 1 {
                warn!(
                    "event=favorite_duplicates module=favorites status=warn event_id={} count={}",
                    event_id,
                    existing.len()
                );
            }
            debug!(
                "event=favorite_add module=favorites status=noop event_id={}",
                event_id
            );
            return Ok(existing.swap_remove(0));
        }

        let document = to_document(&FavoriteDocument {
            user_id: user_id.clone(),
            event_id: event_id.clone(),
        })?;
        let id = self.store.insert(Collection::Favorites, document).await?;

        info!(
            "event=favorite_add module=favorites status=ok link_id={} event_id={}",
            id, event_id
        );
        Ok(FavoriteLink {
            id: FavoriteLinkId::new(id),
            user_id: user_id.clone(),
            event_id: event_id.clone(),
        })
    }

    /// Unmarks an event. Returns how many links were deleted (zero is fine).
    pub async fn remove(&self, session: &Session, event_id: &EventId) -> OrganizerResult<usize> {
        let user_id = session.require_user()?;
        let links = self.links_for(user_id, event_id).await?;

        let mut removed = 0;
        for link in &links {
            // A link deleted concurrently is already in the desired state.
            if self
                .store
                .delete_by_id(Collection::Favorites, link.id.as_str())
                .await?
            {
                removed += 1;
            }
        }

        info!(
            "event=favorite_remove module=favorites status=ok event_id={} matched={} removed={}",
            event_id,
            links.len(),
            removed
        );
        Ok(removed)
    }

    /// Event ids the session principal has marked, including orphans.
    pub async fn favorite_event_ids(&self, session: &Session) -> OrganizerResult<HashSet<EventId>> {
        let user_id = session.require_user()?;
        let documents = self
            .store
            .scan_where(
                Collection::Favorites,
                &[FieldEquals::new(USER_ID_FIELD, user_id.as_str())],
            )
            .await?;
        let ids = documents
            .iter()
            .map(|document| link_from_document(document).map(|link| link.event_id))
            .collect::<StoreResult<HashSet<_>>>()?;
        Ok(ids)
    }

    /// Favorite events of the session principal.
    ///
    /// Two reads: favorite links by user, then all events filtered by the id
    /// set. Ids without a live event are dropped; each event appears once.
    pub async fn list_favorite_events(&self, session: &Session) -> OrganizerResult<Vec<Event>> {
        let favorite_ids = self.favorite_event_ids(session).await?;
        if favorite_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let events = self
            .events
            .list()
            .await?
            .into_iter()
            .filter(|event| favorite_ids.contains(&event.id) && seen.insert(event.id.clone()))
            .collect::<Vec<_>>();

        let orphaned = favorite_ids.iter().filter(|id| !seen.contains(*id)).count();
        if orphaned > 0 {
            debug!(
                "event=favorite_list module=favorites status=ok orphaned_links={}",
                orphaned
            );
        }
        Ok(events)
    }

    async fn links_for(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> OrganizerResult<Vec<FavoriteLink>> {
        let documents = self
            .store
            .scan_where(
                Collection::Favorites,
                &[
                    FieldEquals::new(USER_ID_FIELD, user_id.as_str()),
                    FieldEquals::new(EVENT_ID_FIELD, event_id.as_str()),
                ],
            )
            .await?;
        let links = documents
            .iter()
            .map(link_from_document)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(links)
    }
}

fn link_from_document(document: &StoredDocument) -> StoreResult<FavoriteLink> {
    let parsed: FavoriteDocument = from_document(Collection::Favorites, document)?;
    Ok(FavoriteLink {
        id: FavoriteLinkId::new(document.id.clone()),
        user_id: parsed.user_id,
        event_id: parsed.event_id,
    })
}
