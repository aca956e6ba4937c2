//! Payment methods offered at checkout.

use serde::{Deserialize, Serialize};

use super::id::PaymentMethodId;

/// A payment option curated by an administrator.
///
/// `is_visible` controls whether the method is listed on the payment page;
/// `is_enabled` controls whether selecting it completes a checkout. A method
/// can be visible but disabled (shown greyed out).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    /// Machine-readable code submitted by the payment form (e.g. `paypal`).
    pub code: String,
    pub is_enabled: bool,
    pub is_visible: bool,
    pub sort_order: i32,
}

impl PaymentMethod {
    /// Status label used in listings.
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        if self.is_enabled { "ENABLED" } else { "DISABLED" }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.status_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_status() {
        let method = PaymentMethod {
            id: PaymentMethodId::new(1),
            name: "Bank Transfer".to_string(),
            code: "dbt".to_string(),
            is_enabled: false,
            is_visible: true,
            sort_order: 0,
        };
        assert_eq!(method.to_string(), "Bank Transfer (DISABLED)");
    }
}
