//! Orders recorded at checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::OrderId;
use super::price::format_usd;

/// A completed checkout.
///
/// Orders are a point-in-time snapshot: they keep the session that placed
/// them and the charged total, but no line items. They are never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Session identifier of the buyer at checkout time.
    pub session_key: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Total formatted as USD with cents.
    #[must_use]
    pub fn display_total(&self) -> String {
        format_usd(self.total_amount, 2)
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Order #{} - {}", self.id, self.display_total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_display() {
        let order = Order {
            id: OrderId::new(12),
            session_key: "abc".to_string(),
            total_amount: Decimal::new(350_000, 2),
            created_at: Utc::now(),
        };
        assert_eq!(order.to_string(), "Order #12 - $3,500.00");
    }
}
