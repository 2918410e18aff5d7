//! Top-level navigation filtering.
//!
//! The host navigation shell cannot render an empty destination list, so the
//! filter always returns at least one entry.

use orderdesk_auth::{HOME_ONLY, PermissionCode, ResolvedAuthorization, ScreenId};
use serde::Serialize;

use crate::state::AuthorizationState;

/// A top-level destination (tab/drawer entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    pub id: &'static str,
    pub label: &'static str,
    pub screen: ScreenId,
    /// Any of these codes makes the destination visible.
    pub codes: &'static [PermissionCode],
}

const fn code(value: u16) -> PermissionCode {
    PermissionCode::new(value)
}

static STANDARD_CATALOGUE: [Destination; 5] = [
    Destination {
        id: "home",
        label: "Home",
        screen: ScreenId::Home,
        codes: &[code(1), code(4), code(5)],
    },
    Destination {
        id: "orders",
        label: "New Order",
        screen: ScreenId::NewOrder,
        codes: &[code(1)],
    },
    Destination {
        id: "accounts",
        label: "Accounts",
        screen: ScreenId::AccountStatement,
        codes: &[code(2)],
    },
    Destination {
        id: "stock",
        label: "Stock",
        screen: ScreenId::StockSearch,
        codes: &[code(4)],
    },
    Destination {
        id: "reports",
        label: "Reports",
        screen: ScreenId::SalesReport,
        codes: &[code(5)],
    },
];

static NO_ACCESS: Destination = Destination {
    id: "no_access",
    label: "No Access",
    screen: ScreenId::NoAccess,
    codes: &[],
};

/// Destinations shipped with the client, in display order.
pub fn standard_catalogue() -> &'static [Destination] {
    &STANDARD_CATALOGUE
}

/// The placeholder shown when nothing else is visible.
pub fn no_access() -> Destination {
    NO_ACCESS.clone()
}

/// Compute visible destinations for one state snapshot, preserving
/// catalogue order. Never returns an empty list.
pub fn visible_destinations(
    state: &AuthorizationState,
    catalogue: &[Destination],
    fallback: &ScreenId,
) -> Vec<Destination> {
    let Some(resolved) = state.resolved().filter(|_| state.is_ready()) else {
        return vec![no_access()];
    };

    let visible: Vec<Destination> = catalogue
        .iter()
        .filter(|d| d.codes.iter().any(|c| resolved.has_module(*c)))
        .cloned()
        .collect();
    if !visible.is_empty() {
        return visible;
    }

    if is_fallback_only(resolved, fallback) {
        let home: Vec<Destination> = catalogue.iter().filter(|d| &d.screen == fallback).cloned().collect();
        if !home.is_empty() {
            return home;
        }
    }

    tracing::debug!(codes = ?resolved.codes, "no destination visible; showing placeholder");
    vec![no_access()]
}

fn is_fallback_only(resolved: &ResolvedAuthorization, fallback: &ScreenId) -> bool {
    resolved.allowed_screens.len() == 1
        && &resolved.allowed_screens[0] == fallback
        && resolved.allowed_modules.len() == 1
        && resolved.allowed_modules[0].id == HOME_ONLY.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderdesk_auth::{CodeRange, RawPermissionInput, resolve_raw};
    use proptest::prelude::*;

    fn ready(raw: RawPermissionInput) -> AuthorizationState {
        AuthorizationState::ready(resolve_raw(&raw, CodeRange::default(), &ScreenId::Home))
    }

    fn ids(destinations: &[Destination]) -> Vec<&'static str> {
        destinations.iter().map(|d| d.id).collect()
    }

    fn visible(state: &AuthorizationState) -> Vec<Destination> {
        visible_destinations(state, standard_catalogue(), &ScreenId::Home)
    }

    #[test]
    fn destinations_follow_catalogue_order() {
        let state = ready(RawPermissionInput::text("5,1"));
        assert_eq!(ids(&visible(&state)), vec!["home", "orders", "reports"]);
    }

    #[test]
    fn accounts_only_hides_home() {
        let state = ready(RawPermissionInput::text("2"));
        assert_eq!(ids(&visible(&state)), vec!["accounts"]);
    }

    #[test]
    fn degraded_state_shows_fallback_destination() {
        let state = ready(RawPermissionInput::text(","));
        assert_eq!(ids(&visible(&state)), vec!["home"]);
    }

    #[test]
    fn absent_state_shows_placeholder() {
        let state = ready(RawPermissionInput::Absent);
        assert_eq!(visible(&state), vec![no_access()]);
    }

    #[test]
    fn modules_without_destinations_show_placeholder() {
        let state = ready(RawPermissionInput::text("3"));
        assert_eq!(ids(&visible(&state)), vec!["no_access"]);
    }

    #[test]
    fn pending_states_show_placeholder() {
        assert_eq!(ids(&visible(&AuthorizationState::uninitialized())), vec!["no_access"]);
        assert_eq!(ids(&visible(&AuthorizationState::loading())), vec!["no_access"]);
    }

    #[test]
    fn degraded_without_matching_destination_shows_placeholder() {
        let state = ready(RawPermissionInput::text(" "));
        let out = visible_destinations(&state, &standard_catalogue()[1..], &ScreenId::Home);
        assert_eq!(ids(&out), vec!["no_access"]);
    }

    proptest! {
        /// Property: the filter never yields an empty list.
        #[test]
        fn never_empty(text in "[0-9, \\[\\]]{0,12}", absent in any::<bool>()) {
            let raw = if absent { RawPermissionInput::Absent } else { RawPermissionInput::text(text) };
            prop_assert!(!visible(&ready(raw)).is_empty());
        }
    }
}
