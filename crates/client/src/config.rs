//! Client configuration (environment driven).

use std::path::PathBuf;
use std::time::Duration;

use orderdesk_auth::{CodeRange, ScreenId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PERMISSION_KEY: &str = "user_permissions";
pub const DEFAULT_PERSISTENCE_TIMEOUT_MS: u64 = 3_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid permission code range {min}..={max} (min must be >= 1 and <= max)")]
    InvalidCodeRange { min: u16, max: u16 },

    #[error("{var} names an unregistered screen '{value}'")]
    UnregisteredScreen { var: &'static str, value: String },
}

/// Settings for one authorization session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Key holding the raw permission string in the secure store.
    pub permission_key: String,
    /// Codes accepted by the parser.
    pub code_range: CodeRange,
    /// Screen granted by a present-but-empty permission set.
    pub fallback_screen: ScreenId,
    /// Where a guard sends the user the first time it denies a screen.
    pub denied_redirect: ScreenId,
    pub persistence_timeout_ms: u64,
    /// Directory for the SQLite secure store; OS data dir when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            permission_key: DEFAULT_PERMISSION_KEY.to_string(),
            code_range: CodeRange::DEFAULT,
            fallback_screen: ScreenId::Home,
            denied_redirect: ScreenId::Home,
            persistence_timeout_ms: DEFAULT_PERSISTENCE_TIMEOUT_MS,
            data_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn persistence_timeout(&self) -> Duration {
        Duration::from_millis(self.persistence_timeout_ms)
    }

    /// Load from `ORDERDESK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using an arbitrary variable lookup.
    ///
    /// Unparseable numbers fall back to their defaults (with a warning);
    /// an inverted range or an unknown screen name is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let permission_key = lookup("ORDERDESK_PERMISSION_KEY")
            .filter(|k| !k.trim().is_empty())
            .unwrap_or(defaults.permission_key);

        let min = number_or(&lookup, "ORDERDESK_CODE_MIN", defaults.code_range.min);
        let max = number_or(&lookup, "ORDERDESK_CODE_MAX", defaults.code_range.max);
        let code_range = CodeRange::new(min, max).ok_or(ConfigError::InvalidCodeRange { min, max })?;

        let fallback_screen = screen_or(&lookup, "ORDERDESK_FALLBACK_SCREEN", defaults.fallback_screen)?;
        let denied_redirect = screen_or(&lookup, "ORDERDESK_DENIED_REDIRECT", defaults.denied_redirect)?;

        let persistence_timeout_ms = number_or(
            &lookup,
            "ORDERDESK_PERSISTENCE_TIMEOUT_MS",
            defaults.persistence_timeout_ms,
        );

        let data_dir = lookup("ORDERDESK_DATA_DIR").map(PathBuf::from);

        Ok(Self {
            permission_key,
            code_range,
            fallback_screen,
            denied_redirect,
            persistence_timeout_ms,
            data_dir,
        })
    }
}

fn number_or<F, T>(lookup: &F, var: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: core::str::FromStr + core::fmt::Display + Copy,
{
    match lookup(var) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var, value = %raw, %default, "ignoring unparseable setting");
            default
        }),
    }
}

fn screen_or<F>(lookup: &F, var: &'static str, default: ScreenId) -> Result<ScreenId, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    let screen = ScreenId::from(raw.trim().to_string());
    if screen.is_registered() {
        Ok(screen)
    } else {
        Err(ConfigError::UnregisteredScreen { var, value: raw })
    }
}
