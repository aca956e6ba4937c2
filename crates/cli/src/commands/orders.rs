//! Order listing command.

use servicecart_core::Order;
use servicecart_storefront::db::{OrderStore, PgStore};

/// Print the most recent orders, newest first.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the query fails.
#[allow(clippy::print_stdout)]
pub async fn list(limit: i64) -> Result<(), Box<dyn std::error::Error>> {
    if limit < 1 {
        return Err("--limit must be at least 1".into());
    }

    let store = PgStore::new(super::connect().await?);
    let orders = store.list_recent_orders(limit).await?;

    if orders.is_empty() {
        tracing::info!("No orders yet");
        return Ok(());
    }

    for order in &orders {
        println!("{}", order_line(order));
    }

    tracing::info!(count = orders.len(), "Listed orders");
    Ok(())
}

fn order_line(order: &Order) -> String {
    format!(
        "#{:<6} {}  {:>14}  session {}",
        order.id.as_i32(),
        order.created_at.format("%Y-%m-%d %H:%M"),
        order.display_total(),
        order.session_key
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use servicecart_core::OrderId;

    use super::*;

    #[test]
    fn test_order_line() {
        let order = Order {
            id: OrderId::new(7),
            session_key: "k3y".to_string(),
            total_amount: Decimal::new(125_000, 2),
            created_at: Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap(),
        };

        let line = order_line(&order);
        assert!(line.starts_with("#7 "));
        assert!(line.contains("2026-10-19 09:30"));
        assert!(line.contains("$1,250.00"));
        assert!(line.ends_with("session k3y"));
    }
}
