//! `orderdesk-authz`: inspect and edit the persisted session authorization.
//!
//! ```text
//! orderdesk-authz show
//! orderdesk-authz set "<raw permission string>"
//! orderdesk-authz check <ScreenId>
//! orderdesk-authz resolve "<raw permission string>"
//! orderdesk-authz clear
//! ```

use std::sync::Arc;

use anyhow::{Context, bail};
use orderdesk_auth::{ModuleRegistry, RawPermissionInput, ScreenId, explain_screen_access, resolve_raw};
use orderdesk_client::{
    AuthorizationState, AuthorizationStore, ClientConfig, ScreenGuard, SqliteSecureStore, standard_catalogue,
    visible_destinations,
};
use serde_json::json;

const USAGE: &str = "usage: orderdesk-authz <show | set <raw> | check <screen> | resolve <raw> | clear>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    orderdesk_observability::init_pretty();

    let config = ClientConfig::from_env().context("invalid ORDERDESK_* configuration")?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("show");

    if command == "resolve" {
        let raw = RawPermissionInput::text(args.get(1).context(USAGE)?.as_str());
        let resolved = resolve_raw(&raw, config.code_range, &config.fallback_screen);
        return print(&json!({ "raw": raw, "resolved": resolved }));
    }

    let persistence = SqliteSecureStore::open(config.data_dir.clone())?;
    let store = AuthorizationStore::new(config.clone(), Arc::new(persistence));

    match command {
        "show" => {
            let state = store.initialize().await;
            print(&describe(&store, &state))
        }
        "set" => {
            let raw = RawPermissionInput::text(args.get(1).context(USAGE)?.as_str());
            if let Some(write) = store.set_authorization(raw) {
                write.await.context("permission write task failed")?;
            }
            print(&describe(&store, &store.snapshot()))
        }
        "check" => {
            let screen = ScreenId::from(args.get(1).context(USAGE)?.clone());
            let state = store.initialize().await;
            let explanation = explain_screen_access(state.resolved(), &screen, ModuleRegistry::standard());
            print(&json!({
                "decision": ScreenGuard::decide(&screen, &state),
                "explanation": explanation,
            }))
        }
        "clear" => {
            store.clear().await;
            print(&describe(&store, &store.snapshot()))
        }
        other => bail!("unknown command '{other}'\n{USAGE}"),
    }
}

fn describe(store: &AuthorizationStore, state: &AuthorizationState) -> serde_json::Value {
    json!({
        "session_id": store.session_id(),
        "phase": state.phase,
        "resolved": state.resolved(),
        "destinations": visible_destinations(state, standard_catalogue(), &store.config().fallback_screen),
    })
}

fn print(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
