//! Domain services.
//!
//! # Responsibility
//! - Orchestrate document store calls into ownership-aware use cases.
//! - Keep UI/CLI layers decoupled from storage and session mechanics.
//!
//! # Layering
//! - `event_registry` and `favorites_ledger` talk to the store.
//! - `facade` composes both with the session provider.

pub mod error;
pub mod event_registry;
pub mod facade;
pub mod favorites_ledger;
