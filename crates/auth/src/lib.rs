//! `orderdesk-auth`: pure client-side authorization boundary.
//!
//! Turns the server's compact permission-code string into the screens and
//! modules a session may open. No IO, no async, no panics.

pub mod error;
pub mod explain;
pub mod parser;
pub mod permissions;
pub mod registry;
pub mod resolve;
pub mod screens;

pub use error::AuthzFault;
pub use explain::{AccessExplanation, DenialKind, explain_screen_access};
pub use parser::{Presence, RawPermissionInput, parse, presence};
pub use permissions::{CodeRange, PermissionCode};
pub use registry::{HOME_ONLY, Module, ModuleRegistry, fallback_module};
pub use resolve::{ResolvedAuthorization, resolve, resolve_raw};
pub use screens::ScreenId;
