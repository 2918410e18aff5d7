//! Authorization state snapshots shared by the store, guards and navigation.

use std::sync::Arc;

use orderdesk_auth::{Module, PermissionCode, ResolvedAuthorization, ScreenId};
use serde::{Deserialize, Serialize};

/// Lifecycle phase of a session's authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Loading => "loading",
            Phase::Ready => "ready",
        }
    }
}

/// Immutable view of the store at one instant.
///
/// Take one snapshot per logical read and pass it into derived computations
/// instead of re-querying the store midway.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationState {
    pub phase: Phase,
    pub resolved: Option<Arc<ResolvedAuthorization>>,
}

impl AuthorizationState {
    pub fn uninitialized() -> Self {
        Self {
            phase: Phase::Uninitialized,
            resolved: None,
        }
    }

    pub fn loading() -> Self {
        Self {
            phase: Phase::Loading,
            resolved: None,
        }
    }

    pub fn ready(resolved: Option<ResolvedAuthorization>) -> Self {
        Self {
            phase: Phase::Ready,
            resolved: resolved.map(Arc::new),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn resolved(&self) -> Option<&ResolvedAuthorization> {
        self.resolved.as_deref()
    }

    /// Deny-by-default membership test.
    pub fn is_screen_allowed(&self, screen: &ScreenId) -> bool {
        match self.resolved() {
            Some(resolved) => screen.is_registered() && resolved.allows(screen),
            None => false,
        }
    }

    pub fn allowed_screens(&self) -> &[ScreenId] {
        self.resolved().map(|r| r.allowed_screens.as_slice()).unwrap_or(&[])
    }

    pub fn allowed_modules(&self) -> &[Module] {
        self.resolved().map(|r| r.allowed_modules.as_slice()).unwrap_or(&[])
    }

    pub fn has_module_access(&self, code: PermissionCode) -> bool {
        self.resolved().is_some_and(|r| r.has_module(code))
    }
}

impl Default for AuthorizationState {
    fn default() -> Self {
        Self::uninitialized()
    }
}
