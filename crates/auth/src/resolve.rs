use serde::Serialize;

use crate::parser::{self, Presence, RawPermissionInput};
use crate::registry::{Module, ModuleRegistry, fallback_module};
use crate::{AuthzFault, CodeRange, PermissionCode, ScreenId};

/// Screens and modules a session may access, derived from its codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAuthorization {
    pub codes: Vec<PermissionCode>,
    /// Union of module screens, first-seen order, no duplicates.
    pub allowed_screens: Vec<ScreenId>,
    pub allowed_modules: Vec<Module>,
    /// Set for the present-but-empty fallback (one screen, synthetic module).
    pub degraded: bool,
}

impl ResolvedAuthorization {
    /// Fallback-only authorization used when the server sent a blank code set.
    pub fn degraded(fallback: ScreenId) -> Self {
        Self {
            codes: Vec::new(),
            allowed_modules: vec![fallback_module(&fallback)],
            allowed_screens: vec![fallback],
            degraded: true,
        }
    }

    pub fn allows(&self, screen: &ScreenId) -> bool {
        self.allowed_screens.contains(screen)
    }

    pub fn has_module(&self, code: PermissionCode) -> bool {
        self.allowed_modules.iter().any(|m| m.id == code)
    }
}

/// Resolve parsed codes into an authorization.
///
/// - No IO
/// - No panics
/// - Unknown codes are skipped
///
/// Returns `None` only when nothing was ever configured (`Presence::Absent`
/// with no codes); callers treat that as deny-all.
pub fn resolve(
    codes: &[PermissionCode],
    presence: Presence,
    fallback: &ScreenId,
    registry: &ModuleRegistry,
) -> Option<ResolvedAuthorization> {
    if codes.is_empty() {
        match presence {
            Presence::Absent => return None,
            Presence::Blank => return Some(ResolvedAuthorization::degraded(fallback.clone())),
            Presence::Present => {}
        }
    }

    let mut resolved = ResolvedAuthorization {
        codes: Vec::with_capacity(codes.len()),
        allowed_screens: Vec::new(),
        allowed_modules: Vec::new(),
        degraded: false,
    };

    for &code in codes {
        if resolved.codes.contains(&code) {
            continue;
        }
        resolved.codes.push(code);

        let Some(module) = registry.module(code) else {
            let fault = AuthzFault::UnknownModuleCode(code);
            tracing::debug!(fault = fault.kind(), %code, "skipping code without a registered module");
            continue;
        };

        for screen in module.screens {
            if !resolved.allowed_screens.contains(screen) {
                resolved.allowed_screens.push(screen.clone());
            }
        }
        resolved.allowed_modules.push(*module);
    }

    Some(resolved)
}

/// Parse and resolve a raw value against the standard registry.
pub fn resolve_raw(
    raw: &RawPermissionInput,
    range: CodeRange,
    fallback: &ScreenId,
) -> Option<ResolvedAuthorization> {
    let codes = parser::parse(raw, range);
    resolve(&codes, parser::presence(raw), fallback, ModuleRegistry::standard())
}
