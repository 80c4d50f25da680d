//! Event domain model.
//!
//! # Responsibility
//! - Define the event record and its mutable field set.
//! - Validate caller-supplied fields before they reach storage.
//!
//! # Invariants
//! - `id` is assigned by the document store and never changes.
//! - `creator_id` is stamped once from the acting principal.
//! - `date` must look like `YYYY-MM-DD`; calendar correctness is not checked.

use crate::model::user::UserId;
use crate::model::validation::{require_non_blank, ValidationError, ValidationFailure};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Accepted shape for `EventFields::date`.
pub const EVENT_DATE_FORMAT: &str = "YYYY-MM-DD";

static EVENT_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid event date regex"));

opaque_id!(
    /// Store-assigned identifier of an event.
    EventId
);

/// Caller-editable part of an event.
///
/// Serialized field names double as the document keys in the `events`
/// collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFields {
    pub title: String,
    pub description: String,
    /// Calendar date in `YYYY-MM-DD` form.
    pub date: String,
}

impl EventFields {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            date: date.into(),
        }
    }

    /// Validates fields in declaration order and reports the first failure.
    ///
    /// Values are checked as given; surrounding whitespace is kept on write.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("title", &self.title)?;
        require_non_blank("description", &self.description)?;
        require_non_blank("date", &self.date)?;
        if !EVENT_DATE_RE.is_match(&self.date) {
            return Err(ValidationError::new(
                "date",
                ValidationFailure::InvalidFormat {
                    expected: EVENT_DATE_FORMAT,
                },
            ));
        }
        Ok(())
    }
}

/// Persisted event as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub date: String,
    pub creator_id: UserId,
}

impl Event {
    /// Assembles an event from its identity and field set.
    pub fn from_parts(id: EventId, creator_id: UserId, fields: EventFields) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            date: fields.date,
            creator_id,
        }
    }

    /// Returns a copy of the mutable field set.
    pub fn fields(&self) -> EventFields {
        EventFields::new(
            self.title.clone(),
            self.description.clone(),
            self.date.clone(),
        )
    }

    /// Ownership is plain identifier equality.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.creator_id == *user_id
    }
}
