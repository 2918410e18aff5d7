//! Fault taxonomy for the authorization path.
//!
//! None of these cross a public boundary as an `Err`: each one is recovered
//! where it occurs and only surfaces as a log event.

use thiserror::Error;

use crate::{PermissionCode, ScreenId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzFault {
    /// The raw permission value could not be interpreted.
    #[error("malformed permission input: {0}")]
    MalformedInput(String),

    /// Reading or writing the persisted permission value failed.
    #[error("persistence fault: {0}")]
    PersistenceFault(String),

    /// A code inside the accepted range has no registered module.
    #[error("unknown module code {0}")]
    UnknownModuleCode(PermissionCode),

    /// A guard was asked about a screen the registry does not know.
    #[error("guard invoked for unregistered screen '{0}'")]
    GuardMisuse(ScreenId),
}

impl AuthzFault {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::PersistenceFault(msg.into())
    }

    /// Short stable label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthzFault::MalformedInput(_) => "malformed_input",
            AuthzFault::PersistenceFault(_) => "persistence_fault",
            AuthzFault::UnknownModuleCode(_) => "unknown_module_code",
            AuthzFault::GuardMisuse(_) => "guard_misuse",
        }
    }
}
