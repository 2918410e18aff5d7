//! `orderdesk-client`
//!
//! **Responsibility:** session-side authorization for the ordering client.
//!
//! This crate provides:
//! - A session-scoped `AuthorizationStore` backed by secure persistence
//! - Per-screen render guards
//! - Top-level navigation filtering
//!
//! Parsing and resolution live in `orderdesk-auth`; this crate owns state,
//! I/O and the render-facing decisions built on it.

pub mod config;
pub mod guard;
pub mod navigation;
pub mod persistence;
pub mod sqlite_store;
pub mod state;
pub mod store;

pub use config::{ClientConfig, ConfigError};
pub use guard::{GuardDecision, Redirect, ScreenGuard};
pub use navigation::{Destination, no_access, standard_catalogue, visible_destinations};
pub use persistence::{InMemorySecureStore, PersistenceError, SecureStore};
pub use sqlite_store::SqliteSecureStore;
pub use state::{AuthorizationState, Phase};
pub use store::AuthorizationStore;
