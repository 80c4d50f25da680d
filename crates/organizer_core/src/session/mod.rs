//! Session contract between the domain core and the authentication provider.
//!
//! # Responsibility
//! - Model the acting principal as an explicit `Session` value.
//! - Define the provider interface the facade re-reads on every call.
//!
//! # Invariants
//! - The provider is the only source of truth for who is acting now.
//! - Listeners are notified after the provider's current session changed.

use crate::model::user::UserId;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod credentials;
pub mod memory;

/// Acting principal attached to an intent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    SignedIn { user_id: UserId },
}

impl Session {
    pub fn signed_in(user_id: impl Into<UserId>) -> Self {
        Self::SignedIn {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::SignedIn { user_id } => Some(user_id),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }

    /// Returns the principal or `AuthError::NotSignedIn`.
    pub fn require_user(&self) -> Result<&UserId, AuthError> {
        self.user_id().ok_or(AuthError::NotSignedIn)
    }
}

/// Observed session lifecycle: `SignedOut -> SignedIn -> SignedOut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    SignedIn,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignedOut => "signed_out",
            Self::SignedIn => "signed_in",
        }
    }
}

impl From<&Session> for SessionState {
    fn from(value: &Session) -> Self {
        if value.is_signed_in() {
            Self::SignedIn
        } else {
            Self::SignedOut
        }
    }
}

/// Authentication failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Operation requires a signed-in principal.
    NotSignedIn,
    /// Caller's principal is no longer the provider's current principal.
    StaleSession,
    InvalidCredentials,
    AccountExists,
    /// Provider-specific failure.
    Provider(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSignedIn => write!(f, "sign-in required"),
            Self::StaleSession => write!(f, "session is no longer current"),
            Self::InvalidCredentials => write!(f, "invalid email or password"),
            Self::AccountExists => write!(f, "account already exists"),
            Self::Provider(message) => write!(f, "authentication provider error: {message}"),
        }
    }
}

impl Error for AuthError {}

/// Callback invoked with the new current session.
pub type SessionListener = Arc<dyn Fn(&Session) + Send + Sync>;

/// Handle returned by `SessionProvider::on_session_change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// External authentication provider.
///
/// Credential mechanics stay behind this trait; the core only sees the
/// resulting `Session`.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    fn current_session(&self) -> Session;

    fn on_session_change(&self, listener: SessionListener) -> SubscriptionId;

    /// Returns `false` when the subscription was unknown.
    fn unsubscribe(&self, subscription: SubscriptionId) -> bool;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

#[cfg(test)]
mod tests {
    use super::{AuthError, Session, SessionState};
    use crate::model::user::UserId;

    #[test]
    fn anonymous_session_has_no_principal() {
        let session = Session::default();
        assert_eq!(session, Session::Anonymous);
        assert_eq!(session.require_user(), Err(AuthError::NotSignedIn));
        assert_eq!(SessionState::from(&session), SessionState::SignedOut);
    }

    #[test]
    fn signed_in_session_exposes_principal() {
        let session = Session::signed_in("alice");
        assert_eq!(session.require_user(), Ok(&UserId::from("alice")));
        assert_eq!(SessionState::from(&session).as_str(), "signed_in");
    }
}
