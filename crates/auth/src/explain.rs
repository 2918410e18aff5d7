//! Access explanation (audit/debug trail).
//!
//! Answers "why can (or can't) this session open this screen?" in a form that
//! can be logged or printed as JSON.

use serde::Serialize;

use crate::{ModuleRegistry, ResolvedAuthorization, ScreenId};

/// Detailed explanation of a screen access decision.
#[derive(Debug, Clone, Serialize)]
pub struct AccessExplanation {
    pub screen: ScreenId,
    pub granted: bool,
    /// Human-readable reason for the decision.
    pub reason: String,
    pub held: Option<HeldAuthorization>,
    pub denial: Option<DenialReason>,
}

/// What the session currently holds.
#[derive(Debug, Clone, Serialize)]
pub struct HeldAuthorization {
    pub codes: Vec<u16>,
    pub modules: Vec<String>,
    pub degraded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    /// Modules that would grant the screen, as `"<code>:<name>"`.
    pub granted_by: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    NoAuthorization,
    UnregisteredScreen,
    NotInModules,
}

/// Explain the access decision for `screen` under `resolved`.
pub fn explain_screen_access(
    resolved: Option<&ResolvedAuthorization>,
    screen: &ScreenId,
    registry: &ModuleRegistry,
) -> AccessExplanation {
    let granted_by: Vec<String> = registry
        .modules_granting(screen)
        .iter()
        .map(|m| format!("{}:{}", m.id, m.name))
        .collect();

    let Some(resolved) = resolved else {
        return AccessExplanation {
            screen: screen.clone(),
            granted: false,
            reason: "No authorization has been configured for this session".to_string(),
            held: None,
            denial: Some(DenialReason {
                kind: DenialKind::NoAuthorization,
                granted_by,
            }),
        };
    };

    let held = HeldAuthorization {
        codes: resolved.codes.iter().map(|c| c.get()).collect(),
        modules: resolved.allowed_modules.iter().map(|m| m.name.to_string()).collect(),
        degraded: resolved.degraded,
    };

    if !screen.is_registered() {
        return AccessExplanation {
            screen: screen.clone(),
            granted: false,
            reason: format!("Screen '{screen}' is not a registered screen"),
            held: Some(held),
            denial: Some(DenialReason {
                kind: DenialKind::UnregisteredScreen,
                granted_by: Vec::new(),
            }),
        };
    }

    if resolved.allows(screen) {
        let reason = if resolved.degraded {
            format!("Screen '{screen}' is the fallback granted to an empty permission set")
        } else {
            let via: Vec<&str> = resolved
                .allowed_modules
                .iter()
                .filter(|m| m.grants(screen))
                .map(|m| m.name)
                .collect();
            format!("Screen '{screen}' is unlocked by {}", via.join(", "))
        };

        return AccessExplanation {
            screen: screen.clone(),
            granted: true,
            reason,
            held: Some(held),
            denial: None,
        };
    }

    AccessExplanation {
        screen: screen.clone(),
        granted: false,
        reason: format!("None of the held modules {:?} list screen '{screen}'", held.modules),
        held: Some(held),
        denial: Some(DenialReason {
            kind: DenialKind::NotInModules,
            granted_by,
        }),
    }
}
