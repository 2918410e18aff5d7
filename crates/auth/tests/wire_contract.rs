//! Resolution of every textual form the server is known to send.

use orderdesk_auth::{CodeRange, Module, PermissionCode, RawPermissionInput, ScreenId, resolve_raw};

fn resolve(raw: RawPermissionInput) -> Option<orderdesk_auth::ResolvedAuthorization> {
    resolve_raw(&raw, CodeRange::default(), &ScreenId::Home)
}

fn ids(modules: &[Module]) -> Vec<u16> {
    modules.iter().map(|m| m.id.get()).collect()
}

#[test]
fn never_configured_is_null() {
    assert!(resolve(RawPermissionInput::Absent).is_none());
    assert!(resolve(RawPermissionInput::from(None)).is_none());
}

#[test]
fn bare_separators_degrade_to_home_only() {
    for text in [",", "\",\"", " ", "\t\n", ",,,", ""] {
        let out = resolve(RawPermissionInput::text(text)).expect("present input resolves");
        assert_eq!(out.allowed_screens, vec![ScreenId::Home], "{text:?}");
        assert_eq!(ids(&out.allowed_modules), vec![0], "{text:?}");
        assert_eq!(out.allowed_modules[0].name, "Home Only");
    }
}

#[test]
fn csv_form() {
    let out = resolve(RawPermissionInput::text("1,4")).unwrap();
    assert_eq!(out.codes, vec![PermissionCode::new(1), PermissionCode::new(4)]);
    assert_eq!(out.allowed_screens.iter().filter(|s| **s == ScreenId::Home).count(), 1);
}

#[test]
fn json_array_form() {
    let out = resolve(RawPermissionInput::text("[1,5]")).unwrap();
    assert_eq!(ids(&out.allowed_modules), vec![1, 5]);

    let mut expected: Vec<ScreenId> = Vec::new();
    for module in &out.allowed_modules {
        for screen in module.screens {
            if !expected.contains(screen) {
                expected.push(screen.clone());
            }
        }
    }
    assert_eq!(out.allowed_screens, expected);
}

#[test]
fn single_non_listing_module_denies_home() {
    let out = resolve(RawPermissionInput::text("2")).unwrap();
    assert!(!out.allows(&ScreenId::Home));
    assert!(out.allowed_screens.iter().all(|s| matches!(
        s,
        ScreenId::AccountStatement | ScreenId::Invoices | ScreenId::InvoiceDetail | ScreenId::Payments
    )));
}

#[test]
fn raw_input_deserializes_from_json_payloads() {
    let list: RawPermissionInput = serde_json::from_str("[1, \"4\"]").unwrap();
    assert_eq!(ids(&resolve(list).unwrap().allowed_modules), vec![1, 4]);

    let text: RawPermissionInput = serde_json::from_str("\"5\"").unwrap();
    assert_eq!(ids(&resolve(text).unwrap().allowed_modules), vec![5]);

    let null: RawPermissionInput = serde_json::from_str("null").unwrap();
    assert!(resolve(null).is_none());
}

#[test]
fn array_and_string_forms_of_one_payload_resolve_alike() {
    for payload in ["[\",\"]", "[null]", "[\"\"]", "[1,\"4\"]"] {
        let list: RawPermissionInput = serde_json::from_str(payload).unwrap();
        assert!(matches!(list, RawPermissionInput::List(_)), "{payload}");
        assert_eq!(resolve(list), resolve(RawPermissionInput::text(payload)), "{payload}");
    }

    let out = resolve(RawPermissionInput::List(vec![serde_json::json!(",")])).unwrap();
    assert!(out.degraded);
    assert_eq!(out.allowed_screens, vec![ScreenId::Home]);
}
