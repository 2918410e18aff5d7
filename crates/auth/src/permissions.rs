use serde::{Deserialize, Serialize};

/// Permission code identifier.
///
/// Codes are small integers issued by the server; each one unlocks exactly one
/// [`Module`](crate::Module). The special code `0` is reserved for the
/// synthetic "Home Only" module and is never accepted from the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionCode(u16);

impl PermissionCode {
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

impl core::fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u16> for PermissionCode {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// Inclusive range of codes the parser accepts.
///
/// Codes outside the range are dropped during parsing. The range is
/// configurable so that a server introducing new modules does not require a
/// parser change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRange {
    pub min: u16,
    pub max: u16,
}

impl CodeRange {
    pub const DEFAULT: CodeRange = CodeRange { min: 1, max: 5 };

    /// Returns `None` when `min > max` or `min == 0` (zero is reserved).
    pub fn new(min: u16, max: u16) -> Option<Self> {
        if min == 0 || min > max {
            return None;
        }
        Some(Self { min, max })
    }

    /// Convert an arbitrary integer into a code if it falls inside the range.
    pub fn accept(&self, value: i64) -> Option<PermissionCode> {
        if value < i64::from(self.min) || value > i64::from(self.max) {
            return None;
        }
        u16::try_from(value).ok().map(PermissionCode)
    }
}

impl Default for CodeRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}
