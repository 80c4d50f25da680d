//! In-process session provider.
//!
//! Stands in for the hosted authentication service in tests and local
//! tooling. Accounts live only as long as the provider value.

use crate::model::user::UserId;
use crate::session::{AuthError, Session, SessionListener, SessionProvider, SubscriptionId};
use async_trait::async_trait;
use log::info;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use uuid::Uuid;

struct Account {
    user_id: UserId,
    password: String,
}

/// Session provider with in-memory accounts and listener registry.
#[derive(Default)]
pub struct InMemorySessionProvider {
    accounts: Mutex<HashMap<String, Account>>,
    current: RwLock<Session>,
    listeners: Mutex<BTreeMap<SubscriptionId, SessionListener>>,
    next_subscription: AtomicU64,
}

impl InMemorySessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current session as if the external provider switched
    /// principal on its own (token refresh, another screen signing out).
    pub fn set_session(&self, session: Session) {
        self.replace_session(session);
    }

    fn replace_session(&self, session: Session) {
        {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            if *current == session {
                return;
            }
            *current = session.clone();
        }

        // Listeners run outside the lock so they may call back into the provider.
        let listeners: Vec<SessionListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(&session);
        }
    }
}

#[async_trait]
impl SessionProvider for InMemorySessionProvider {
    fn current_session(&self) -> Session {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn on_session_change(&self, listener: SessionListener) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, listener);
        id
    }

    fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&subscription)
            .is_some()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user_id = {
            let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
            match accounts.get(&normalize_email(email)) {
                Some(account) if account.password == password => account.user_id.clone(),
                _ => return Err(AuthError::InvalidCredentials),
            }
        };

        let session = Session::SignedIn { user_id };
        self.replace_session(session.clone());
        info!("event=sign_in module=session status=ok");
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user_id = {
            let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
            let key = normalize_email(email);
            if accounts.contains_key(&key) {
                return Err(AuthError::AccountExists);
            }
            let user_id = UserId::new(Uuid::new_v4().simple().to_string());
            accounts.insert(
                key,
                Account {
                    user_id: user_id.clone(),
                    password: password.to_string(),
                },
            );
            user_id
        };

        let session = Session::SignedIn { user_id };
        self.replace_session(session.clone());
        info!("event=sign_up module=session status=ok");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.replace_session(Session::Anonymous);
        info!("event=sign_out module=session status=ok");
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
