//! Organizer facade: the single entry point for UI, CLI and bindings.
//!
//! # Responsibility
//! - Accept intent-shaped calls tagged with the caller's explicit `Session`.
//! - Re-derive the provider's current session on every call and reject
//!   callers whose principal is no longer current.
//! - Observe provider session changes for the lifetime of the facade.
//!
//! # Invariants
//! - No principal is cached between calls.
//! - Event listing and the dashboard accept anonymous callers and read stale
//!   ones as anonymous; everything else requires a current signed-in principal.

use crate::model::event::{Event, EventFields, EventId};
use crate::model::favorite::FavoriteToggle;
use crate::service::error::OrganizerResult;
use crate::service::event_registry::EventRegistry;
use crate::service::favorites_ledger::FavoritesLedger;
use crate::session::credentials::validate_credentials;
use crate::session::{AuthError, Session, SessionProvider, SessionState, SubscriptionId};
use crate::store::DocumentStore;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Dashboard row: an event plus caller-relative flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardEntry {
    pub event: Event,
    /// Caller may edit/delete this event.
    pub owned_by_caller: bool,
    pub favorited: bool,
}

/// Composes session provider, event registry and favorites ledger.
pub struct OrganizerFacade<S: DocumentStore, P: SessionProvider> {
    provider: Arc<P>,
    events: EventRegistry<S>,
    favorites: FavoritesLedger<S>,
    observed: Arc<Mutex<SessionState>>,
    subscription: SubscriptionId,
}

impl<S: DocumentStore, P: SessionProvider> OrganizerFacade<S, P> {
    /// Builds the facade and subscribes to provider session changes.
    pub fn new(store: Arc<S>, provider: Arc<P>) -> Self {
        let events = EventRegistry::new(Arc::clone(&store));
        let favorites = FavoritesLedger::new(store, events.clone());

        let observed = Arc::new(Mutex::new(SessionState::from(
            &provider.current_session(),
        )));
        let listener_state = Arc::clone(&observed);
        let subscription = provider.on_session_change(Arc::new(move |session: &Session| {
            let next = SessionState::from(session);
            let mut state = listener_state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *state != next {
                info!(
                    "event=session_change module=facade status=ok from={} to={}",
                    state.as_str(),
                    next.as_str()
                );
                *state = next;
            }
        }));

        Self {
            provider,
            events,
            favorites,
            observed,
            subscription,
        }
    }

    /// Session lifecycle state as last observed from the provider.
    pub fn observed_state(&self) -> SessionState {
        *self.observed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Provider subscription held until the facade is dropped.
    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Provider's current session, for callers that need to tag intents.
    pub fn current_session(&self) -> Session {
        self.provider.current_session()
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> OrganizerResult<Session> {
        validate_credentials(email, password)?;
        Ok(self.provider.sign_up(email.trim(), password).await?)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> OrganizerResult<Session> {
        validate_credentials(email, password)?;
        Ok(self.provider.sign_in(email.trim(), password).await?)
    }

    pub async fn sign_out(&self) -> OrganizerResult<()> {
        Ok(self.provider.sign_out().await?)
    }

    pub async fn create_event(&self, caller: &Session, fields: EventFields) -> OrganizerResult<Event> {
        let session = self.authorize(caller)?;
        self.events.create(&session, fields).await
    }

    pub async fn edit_event(
        &self,
        caller: &Session,
        event_id: &EventId,
        fields: EventFields,
    ) -> OrganizerResult<Event> {
        let session = self.authorize(caller)?;
        self.events.update(&session, event_id, fields).await
    }

    pub async fn delete_event(&self, caller: &Session, event_id: &EventId) -> OrganizerResult<()> {
        let session = self.authorize(caller)?;
        self.events.delete(&session, event_id).await
    }

    /// Lists every event. Reading is open to anonymous and stale callers.
    pub async fn list_events(&self, caller: &Session) -> OrganizerResult<Vec<Event>> {
        self.reader_session(caller);
        self.events.list().await
    }

    pub async fn get_event(&self, caller: &Session, event_id: &EventId) -> OrganizerResult<Event> {
        let session = self.authorize(caller)?;
        session.require_user()?;
        self.events.get_by_id(event_id).await
    }

    /// Flips the favorite mark of one event for the caller.
    pub async fn toggle_favorite(
        &self,
        caller: &Session,
        event_id: &EventId,
    ) -> OrganizerResult<FavoriteToggle> {
        let session = self.authorize(caller)?;
        if self.favorites.is_favorited(&session, event_id).await? {
            let links_removed = self.favorites.remove(&session, event_id).await?;
            Ok(FavoriteToggle::Removed { links_removed })
        } else {
            let link = self.favorites.add(&session, event_id).await?;
            Ok(FavoriteToggle::Added(link))
        }
    }

    pub async fn list_favorites(&self, caller: &Session) -> OrganizerResult<Vec<Event>> {
        let session = self.authorize(caller)?;
        self.favorites.list_favorite_events(&session).await
    }

    /// All events annotated for the caller.
    ///
    /// Anonymous callers, and stale callers read as anonymous, get no flags set.
    pub async fn dashboard(&self, caller: &Session) -> OrganizerResult<Vec<DashboardEntry>> {
        let session = self.reader_session(caller);
        let favorite_ids = match session.user_id() {
            Some(_) => self.favorites.favorite_event_ids(&session).await?,
            None => HashSet::new(),
        };

        let entries = self
            .events
            .list()
            .await?
            .into_iter()
            .map(|event| DashboardEntry {
                owned_by_caller: session
                    .user_id()
                    .is_some_and(|user_id| event.is_owned_by(user_id)),
                favorited: favorite_ids.contains(&event.id),
                event,
            })
            .collect();
        Ok(entries)
    }

    /// Reconciles the caller's session with the provider's current one.
    ///
    /// Anonymous callers stay anonymous even when someone is signed in.
    fn authorize(&self, caller: &Session) -> OrganizerResult<Session> {
        self.reconcile(caller).ok_or_else(|| {
            warn!(
                "event=authorize module=facade status=error error_code=stale_session caller_state={} current_state={}",
                SessionState::from(caller).as_str(),
                SessionState::from(&self.provider.current_session()).as_str()
            );
            AuthError::StaleSession.into()
        })
    }

    /// Session for open reads: a stale principal is read as anonymous.
    fn reader_session(&self, caller: &Session) -> Session {
        self.reconcile(caller).unwrap_or_else(|| {
            debug!("event=authorize module=facade status=ok read_as=anonymous reason=stale_session");
            Session::Anonymous
        })
    }

    /// `None` when the caller's principal is no longer current.
    fn reconcile(&self, caller: &Session) -> Option<Session> {
        let Some(user_id) = caller.user_id() else {
            return Some(Session::Anonymous);
        };
        let current = self.provider.current_session();
        (current.user_id() == Some(user_id)).then_some(current)
    }
}

impl<S: DocumentStore, P: SessionProvider> Drop for OrganizerFacade<S, P> {
    fn drop(&mut self) {
        self.provider.unsubscribe(self.subscription);
    }
}
