//! Per-screen render guard.

use orderdesk_auth::{AuthzFault, ScreenId};
use serde::Serialize;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::state::AuthorizationState;

/// What a protected screen should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardDecision {
    /// Authorization not loaded yet: show a loading indicator.
    Pending,
    /// Loaded, and this screen is not allowed: show a denial message.
    Denied,
    Allowed,
}

/// Navigation side effect triggered on denial.
pub trait Redirect {
    fn redirect(&self, destination: &ScreenId);
}

impl<F> Redirect for F
where
    F: Fn(&ScreenId),
{
    fn redirect(&self, destination: &ScreenId) {
        self(destination)
    }
}

/// Guard for one mounted screen instance.
///
/// Redirects at most once per instance, the first time it observes a
/// Ready+Denied state; later evaluations of the same instance only report
/// `Denied`.
#[derive(Debug)]
pub struct ScreenGuard {
    instance_id: Uuid,
    screen: ScreenId,
    fallback: ScreenId,
    redirected: bool,
}

impl ScreenGuard {
    pub fn new(screen: ScreenId, fallback: ScreenId) -> Self {
        if !screen.is_registered() {
            let fault = AuthzFault::GuardMisuse(screen.clone());
            tracing::debug!(fault = fault.kind(), %screen, "guarding an unregistered screen; it will always be denied");
        }
        Self {
            instance_id: Uuid::now_v7(),
            screen,
            fallback,
            redirected: false,
        }
    }

    pub fn for_config(screen: ScreenId, config: &ClientConfig) -> Self {
        Self::new(screen, config.denied_redirect.clone())
    }

    pub fn screen(&self) -> &ScreenId {
        &self.screen
    }

    pub fn has_redirected(&self) -> bool {
        self.redirected
    }

    /// Side-effect free decision for `screen` under `state`.
    pub fn decide(screen: &ScreenId, state: &AuthorizationState) -> GuardDecision {
        if !state.is_ready() {
            GuardDecision::Pending
        } else if state.is_screen_allowed(screen) {
            GuardDecision::Allowed
        } else {
            GuardDecision::Denied
        }
    }

    /// Decide, and fire the one-time redirect on first denial.
    pub fn evaluate<R>(&mut self, state: &AuthorizationState, redirect: &R) -> GuardDecision
    where
        R: Redirect + ?Sized,
    {
        let decision = Self::decide(&self.screen, state);
        if decision != GuardDecision::Denied || self.redirected {
            return decision;
        }

        self.redirected = true;
        // Redirecting a denied fallback to itself would loop.
        if self.fallback == self.screen {
            tracing::warn!(instance_id = %self.instance_id, screen = %self.screen, "fallback screen itself is denied; not redirecting");
            return decision;
        }

        tracing::info!(
            instance_id = %self.instance_id,
            screen = %self.screen,
            destination = %self.fallback,
            "screen denied; redirecting"
        );
        redirect.redirect(&self.fallback);
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use orderdesk_auth::{CodeRange, RawPermissionInput, resolve_raw};

    fn ready(text: Option<&str>) -> AuthorizationState {
        let raw = RawPermissionInput::from(text.map(str::to_string));
        AuthorizationState::ready(resolve_raw(&raw, CodeRange::default(), &ScreenId::Home))
    }

    #[derive(Default)]
    struct Recorder(RefCell<Vec<ScreenId>>);

    impl Redirect for Recorder {
        fn redirect(&self, destination: &ScreenId) {
            self.0.borrow_mut().push(destination.clone());
        }
    }

    #[test]
    fn not_ready_is_pending_not_denied() {
        let recorder = Recorder::default();
        let mut guard = ScreenGuard::new(ScreenId::Cart, ScreenId::Home);

        assert_eq!(guard.evaluate(&AuthorizationState::uninitialized(), &recorder), GuardDecision::Pending);
        assert_eq!(guard.evaluate(&AuthorizationState::loading(), &recorder), GuardDecision::Pending);
        assert!(recorder.0.borrow().is_empty());
    }

    #[test]
    fn ready_without_authorization_is_denied() {
        assert_eq!(ScreenGuard::decide(&ScreenId::Home, &ready(None)), GuardDecision::Denied);
    }

    #[test]
    fn allowed_screen_renders() {
        let recorder = Recorder::default();
        let mut guard = ScreenGuard::new(ScreenId::Invoices, ScreenId::Home);
        assert_eq!(guard.evaluate(&ready(Some("2")), &recorder), GuardDecision::Allowed);
        assert!(!guard.has_redirected());
    }

    #[test]
    fn denial_redirects_exactly_once() {
        let recorder = Recorder::default();
        let mut guard = ScreenGuard::new(ScreenId::Invoices, ScreenId::Home);
        let state = ready(Some("1"));

        for _ in 0..3 {
            assert_eq!(guard.evaluate(&state, &recorder), GuardDecision::Denied);
        }
        assert_eq!(*recorder.0.borrow(), vec![ScreenId::Home]);
    }

    #[test]
    fn denied_fallback_does_not_redirect_to_itself() {
        let recorder = Recorder::default();
        let mut guard = ScreenGuard::new(ScreenId::Home, ScreenId::Home);
        assert_eq!(guard.evaluate(&ready(Some("2")), &recorder), GuardDecision::Denied);
        assert!(recorder.0.borrow().is_empty());
    }

    #[test]
    fn unregistered_screen_is_always_denied() {
        let state = ready(Some("1,2,3,4,5"));
        let screen = ScreenId::Other("LegacyScreen".into());
        assert_eq!(ScreenGuard::decide(&screen, &state), GuardDecision::Denied);
    }

    #[test]
    fn closures_can_redirect() {
        let hits = RefCell::new(0);
        let mut guard = ScreenGuard::new(ScreenId::SalesReport, ScreenId::Home);
        guard.evaluate(&ready(Some("1")), &|_: &ScreenId| *hits.borrow_mut() += 1);
        assert_eq!(*hits.borrow(), 1);
    }
}
