//! Event registry.
//!
//! # Responsibility
//! - Own event create/update/delete/list/get against the `events` collection.
//! - Enforce ownership through one check shared by every mutation.
//!
//! # Invariants
//! - `creator_id` comes from the acting session and is never part of an update.
//! - Ownership is checked before field validation, so non-owners always see
//!   `Permission`.
//! - Deleting an event leaves its favorite links in place.

use crate::model::event::{Event, EventFields, EventId};
use crate::model::user::UserId;
use crate::service::error::{OrganizerError, OrganizerResult};
use crate::session::Session;
use crate::store::{
    from_document, to_document, Collection, DocumentStore, StoreError, StoreResult,
    StoredDocument,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Document shape of the `events` collection.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDocument {
    title: String,
    description: String,
    date: String,
    creator_id: UserId,
}

/// Event CRUD service with ownership enforcement.
pub struct EventRegistry<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> Clone for EventRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> EventRegistry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates an event owned by the session principal.
    pub async fn create(&self, session: &Session, fields: EventFields) -> OrganizerResult<Event> {
        let creator_id = session.require_user()?.clone();
        fields.validate()?;

        let document = to_document(&EventDocument {
            title: fields.title.clone(),
            description: fields.description.clone(),
            date: fields.date.clone(),
            creator_id: creator_id.clone(),
        })?;
        let id = EventId::new(self.store.insert(Collection::Events, document).await?);

        info!(
            "event=event_create module=registry status=ok event_id={} creator_id={}",
            id, creator_id
        );
        Ok(Event::from_parts(id, creator_id, fields))
    }

    /// Replaces title/description/date of an owned event.
    pub async fn update(
        &self,
        session: &Session,
        event_id: &EventId,
        fields: EventFields,
    ) -> OrganizerResult<Event> {
        let user_id = session.require_user()?;
        let existing = self.get_by_id(event_id).await?;
        ensure_owner(&existing, user_id)?;
        fields.validate()?;

        let partial = to_document(&fields)?;
        match self
            .store
            .update_by_id(Collection::Events, event_id.as_str(), partial)
            .await
        {
            Ok(()) => {}
            Err(StoreError::DocumentNotFound { .. }) => {
                return Err(OrganizerError::NotFound(event_id.clone()));
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            "event=event_update module=registry status=ok event_id={}",
            event_id
        );
        Ok(Event::from_parts(existing.id, existing.creator_id, fields))
    }

    /// Deletes an owned event. Favorite links referencing it are kept.
    pub async fn delete(&self, session: &Session, event_id: &EventId) -> OrganizerResult<()> {
        let user_id = session.require_user()?;
        let existing = self.get_by_id(event_id).await?;
        ensure_owner(&existing, user_id)?;

        let deleted = self
            .store
            .delete_by_id(Collection::Events, event_id.as_str())
            .await?;
        if !deleted {
            return Err(OrganizerError::NotFound(event_id.clone()));
        }

        info!(
            "event=event_delete module=registry status=ok event_id={}",
            event_id
        );
        Ok(())
    }

    /// Lists all events, unordered.
    pub async fn list(&self) -> OrganizerResult<Vec<Event>> {
        let documents = self.store.get_all(Collection::Events).await?;
        let events = documents
            .iter()
            .map(event_from_document)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(events)
    }

    pub async fn get_by_id(&self, event_id: &EventId) -> OrganizerResult<Event> {
        let document = self
            .store
            .get_by_id(Collection::Events, event_id.as_str())
            .await?
            .ok_or_else(|| OrganizerError::NotFound(event_id.clone()))?;
        Ok(event_from_document(&document)?)
    }
}

/// The single authorization primitive: creator equality.
fn ensure_owner(event: &Event, user_id: &UserId) -> OrganizerResult<()> {
    if event.is_owned_by(user_id) {
        return Ok(());
    }

    warn!(
        "event=ownership_denied module=registry status=error event_id={} user_id={}",
        event.id, user_id
    );
    Err(OrganizerError::Permission {
        event_id: event.id.clone(),
        user_id: user_id.clone(),
    })
}

fn event_from_document(document: &StoredDocument) -> StoreResult<Event> {
    let parsed: EventDocument = from_document(Collection::Events, document)?;
    Ok(Event {
        id: EventId::new(document.id.clone()),
        title: parsed.title,
        description: parsed.description,
        date: parsed.date,
        creator_id: parsed.creator_id,
    })
}
