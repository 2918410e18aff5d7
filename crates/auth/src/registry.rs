//! Static module table.
//!
//! Every permission code unlocks exactly one module; a module is a named,
//! ordered bundle of screens. The table is defined once and never mutated.

use serde::Serialize;

use crate::{PermissionCode, ScreenId};

/// A bundle of protected screens unlocked by one permission code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Module {
    pub id: PermissionCode,
    pub name: &'static str,
    pub screens: &'static [ScreenId],
}

impl Module {
    pub fn grants(&self, screen: &ScreenId) -> bool {
        self.screens.contains(screen)
    }
}

static ORDER_SCREENS: [ScreenId; 6] = [
    ScreenId::Home,
    ScreenId::NewOrder,
    ScreenId::CustomerSelect,
    ScreenId::Cart,
    ScreenId::OrderHistory,
    ScreenId::OrderDetail,
];

static ACCOUNT_SCREENS: [ScreenId; 4] = [
    ScreenId::AccountStatement,
    ScreenId::Invoices,
    ScreenId::InvoiceDetail,
    ScreenId::Payments,
];

static STOCK_SCREENS: [ScreenId; 3] = [ScreenId::Home, ScreenId::StockSearch, ScreenId::ProductDetail];

static REPORT_SCREENS: [ScreenId; 3] = [ScreenId::Home, ScreenId::SalesReport, ScreenId::ReportDetail];

/// Every registered screen once; [`fallback_module`] borrows one-element slices.
static FALLBACK_SCREENS: [ScreenId; 15] = [
    ScreenId::Home,
    ScreenId::NewOrder,
    ScreenId::Cart,
    ScreenId::OrderHistory,
    ScreenId::OrderDetail,
    ScreenId::CustomerSelect,
    ScreenId::AccountStatement,
    ScreenId::Invoices,
    ScreenId::InvoiceDetail,
    ScreenId::Payments,
    ScreenId::StockSearch,
    ScreenId::ProductDetail,
    ScreenId::SalesReport,
    ScreenId::ReportDetail,
    ScreenId::NoAccess,
];

static HOME_ONLY_SCREENS: [ScreenId; 1] = [ScreenId::Home];

/// Synthetic module (id 0) standing in for a present-but-empty permission set
/// under the default `HomeScreen` fallback.
pub static HOME_ONLY: Module = Module {
    id: PermissionCode::new(0),
    name: "Home Only",
    screens: &HOME_ONLY_SCREENS,
};

/// The synthetic module for a degraded session falling back to `screen`.
///
/// Shares [`HOME_ONLY`]'s id and name; its screen list is exactly the
/// fallback. An unregistered fallback grants nothing.
pub fn fallback_module(screen: &ScreenId) -> Module {
    let screens: &'static [ScreenId] = match FALLBACK_SCREENS.iter().position(|s| s == screen) {
        Some(i) => &FALLBACK_SCREENS[i..=i],
        None => &[],
    };
    Module { screens, ..HOME_ONLY }
}

static STANDARD_MODULES: [Module; 5] = [
    Module {
        id: PermissionCode::new(1),
        name: "Orders",
        screens: &ORDER_SCREENS,
    },
    Module {
        id: PermissionCode::new(2),
        name: "Accounts",
        screens: &ACCOUNT_SCREENS,
    },
    // Reserved: configuration has no client screens yet.
    Module {
        id: PermissionCode::new(3),
        name: "Configuration",
        screens: &[],
    },
    Module {
        id: PermissionCode::new(4),
        name: "Stock",
        screens: &STOCK_SCREENS,
    },
    Module {
        id: PermissionCode::new(5),
        name: "Reports",
        screens: &REPORT_SCREENS,
    },
];

static STANDARD: ModuleRegistry = ModuleRegistry {
    modules: &STANDARD_MODULES,
};

/// Read-only lookup table of known modules.
#[derive(Debug, Clone, Copy)]
pub struct ModuleRegistry {
    modules: &'static [Module],
}

impl ModuleRegistry {
    /// The table shipped with the client.
    pub fn standard() -> &'static ModuleRegistry {
        &STANDARD
    }

    /// Build a registry over a caller-provided table (tests, staged rollouts).
    pub const fn from_static(modules: &'static [Module]) -> Self {
        Self { modules }
    }

    pub fn module(&self, code: PermissionCode) -> Option<&'static Module> {
        self.modules.iter().find(|m| m.id == code)
    }

    pub fn modules(&self) -> &'static [Module] {
        self.modules
    }

    /// Modules whose screen list contains `screen`, in table order.
    pub fn modules_granting(&self, screen: &ScreenId) -> Vec<&'static Module> {
        self.modules.iter().filter(|m| m.grants(screen)).collect()
    }
}
