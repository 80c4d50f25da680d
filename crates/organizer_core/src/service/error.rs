//! Domain error taxonomy returned by every service entry point.

use crate::model::event::EventId;
use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use crate::session::AuthError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type OrganizerResult<T> = Result<T, OrganizerError>;

/// Errors surfaced to organizer callers.
#[derive(Debug)]
pub enum OrganizerError {
    /// Malformed input; names the first offending field.
    Validation(ValidationError),
    /// No usable session where one is required.
    Auth(AuthError),
    /// Principal does not own the target event.
    Permission { event_id: EventId, user_id: UserId },
    /// Referenced event does not exist.
    NotFound(EventId),
    /// Storage failure, unchanged and not retried.
    Store(StoreError),
}

impl OrganizerError {
    /// Stable short code used in log lines and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Auth(_) => "auth",
            Self::Permission { .. } => "permission",
            Self::NotFound(_) => "not_found",
            Self::Store(_) => "store",
        }
    }
}

impl Display for OrganizerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Auth(err) => write!(f, "{err}"),
            Self::Permission { event_id, user_id } => {
                write!(f, "user {user_id} does not own event {event_id}")
            }
            Self::NotFound(event_id) => write!(f, "event not found: {event_id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OrganizerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Auth(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Permission { .. } | Self::NotFound(_) => None,
        }
    }
}

impl From<ValidationError> for OrganizerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AuthError> for OrganizerError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<StoreError> for OrganizerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
