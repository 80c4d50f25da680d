//! Favorite relation between a user and an event.
//!
//! # Invariants
//! - At most one link per `(user_id, event_id)` is the steady state; callers
//!   must tolerate transient duplicates created by racing writers.
//! - `event_id` may reference an event that no longer exists.

use crate::model::event::EventId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

opaque_id!(
    /// Store-assigned identifier of a favorite link.
    FavoriteLinkId
);

/// "`user_id` marked `event_id` as favorite."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteLink {
    pub id: FavoriteLinkId,
    pub user_id: UserId,
    pub event_id: EventId,
}

/// Outcome of a favorite toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteToggle {
    /// The event is now favorited through this link.
    Added(FavoriteLink),
    /// The event is no longer favorited; `links_removed` is usually 1.
    Removed { links_removed: usize },
}

impl FavoriteToggle {
    pub fn is_favorited(&self) -> bool {
        matches!(self, Self::Added(_))
    }
}
