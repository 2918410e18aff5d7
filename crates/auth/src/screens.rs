use core::convert::Infallible;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable identifier of a navigable screen.
///
/// Known screens form a closed set. Identifiers the client does not recognize
/// (e.g. introduced by a newer server) are carried opaquely in
/// [`ScreenId::Other`]; they are never granted by the registry, so a guard
/// asked about one always denies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScreenId {
    Home,
    NewOrder,
    Cart,
    OrderHistory,
    OrderDetail,
    CustomerSelect,
    AccountStatement,
    Invoices,
    InvoiceDetail,
    Payments,
    StockSearch,
    ProductDetail,
    SalesReport,
    ReportDetail,
    NoAccess,
    Other(String),
}

impl ScreenId {
    pub fn as_str(&self) -> &str {
        match self {
            ScreenId::Home => "HomeScreen",
            ScreenId::NewOrder => "NewOrderScreen",
            ScreenId::Cart => "CartScreen",
            ScreenId::OrderHistory => "OrderHistoryScreen",
            ScreenId::OrderDetail => "OrderDetailScreen",
            ScreenId::CustomerSelect => "CustomerSelectScreen",
            ScreenId::AccountStatement => "AccountStatementScreen",
            ScreenId::Invoices => "InvoicesScreen",
            ScreenId::InvoiceDetail => "InvoiceDetailScreen",
            ScreenId::Payments => "PaymentsScreen",
            ScreenId::StockSearch => "StockSearchScreen",
            ScreenId::ProductDetail => "ProductDetailScreen",
            ScreenId::SalesReport => "SalesReportScreen",
            ScreenId::ReportDetail => "ReportDetailScreen",
            ScreenId::NoAccess => "NoAccessScreen",
            ScreenId::Other(name) => name,
        }
    }

    /// Whether this identifier belongs to the closed set of known screens.
    pub fn is_registered(&self) -> bool {
        !matches!(self, ScreenId::Other(_))
    }
}

impl FromStr for ScreenId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = match s {
            "HomeScreen" => ScreenId::Home,
            "NewOrderScreen" => ScreenId::NewOrder,
            "CartScreen" => ScreenId::Cart,
            "OrderHistoryScreen" => ScreenId::OrderHistory,
            "OrderDetailScreen" => ScreenId::OrderDetail,
            "CustomerSelectScreen" => ScreenId::CustomerSelect,
            "AccountStatementScreen" => ScreenId::AccountStatement,
            "InvoicesScreen" => ScreenId::Invoices,
            "InvoiceDetailScreen" => ScreenId::InvoiceDetail,
            "PaymentsScreen" => ScreenId::Payments,
            "StockSearchScreen" => ScreenId::StockSearch,
            "ProductDetailScreen" => ScreenId::ProductDetail,
            "SalesReportScreen" => ScreenId::SalesReport,
            "ReportDetailScreen" => ScreenId::ReportDetail,
            "NoAccessScreen" => ScreenId::NoAccess,
            other => ScreenId::Other(other.to_string()),
        };
        Ok(id)
    }
}

impl From<String> for ScreenId {
    fn from(value: String) -> Self {
        match ScreenId::from_str(&value) {
            Ok(ScreenId::Other(_)) | Err(_) => ScreenId::Other(value),
            Ok(known) => known,
        }
    }
}

impl From<ScreenId> for String {
    fn from(value: ScreenId) -> Self {
        match value {
            ScreenId::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl core::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_parse_to_variants() {
        assert_eq!("HomeScreen".parse::<ScreenId>().unwrap(), ScreenId::Home);
        assert_eq!("InvoicesScreen".parse::<ScreenId>().unwrap(), ScreenId::Invoices);
    }

    #[test]
    fn unknown_names_pass_through_opaquely() {
        let id: ScreenId = "LoyaltyScreen".parse().unwrap();
        assert_eq!(id, ScreenId::Other("LoyaltyScreen".to_string()));
        assert!(!id.is_registered());
        assert_eq!(id.to_string(), "LoyaltyScreen");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&ScreenId::StockSearch).unwrap();
        assert_eq!(json, "\"StockSearchScreen\"");

        let back: ScreenId = serde_json::from_str("\"PromoScreen\"").unwrap();
        assert_eq!(back, ScreenId::Other("PromoScreen".to_string()));
    }
}
