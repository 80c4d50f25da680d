//! Core domain logic for the event organizer.
//! This crate is the single source of truth for ownership and favorites rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod session;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LogLevel,
    LoggingError,
};
pub use model::event::{Event, EventFields, EventId, EVENT_DATE_FORMAT};
pub use model::favorite::{FavoriteLink, FavoriteLinkId, FavoriteToggle};
pub use model::user::UserId;
pub use model::validation::{ValidationError, ValidationFailure};
pub use service::error::{OrganizerError, OrganizerResult};
pub use service::event_registry::EventRegistry;
pub use service::facade::{DashboardEntry, OrganizerFacade};
pub use service::favorites_ledger::FavoritesLedger;
pub use session::credentials::{validate_credentials, MIN_PASSWORD_CHARS};
pub use session::memory::InMemorySessionProvider;
pub use session::{
    AuthError, Session, SessionListener, SessionProvider, SessionState, SubscriptionId,
};
pub use store::memory::InMemoryDocumentStore;
pub use store::sqlite::SqliteDocumentStore;
pub use store::{
    Collection, Document, DocumentStore, FieldEquals, StoreError, StoreResult, StoredDocument,
};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
