//! Order repository for `PostgreSQL`.
//!
//! Orders are append-only. A trigger in the migration rejects updates, so
//! this module only ever inserts and reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use servicecart_core::{Order, OrderId};

use super::{OrderStore, PgStore, RepositoryError};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    session_key: String,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            session_key: row.session_key,
            total_amount: row.total_amount,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl OrderStore for PgStore {
    #[instrument(skip(self, session_key), fields(total = %total_amount))]
    async fn create_order(
        &self,
        session_key: &str,
        total_amount: Decimal,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO storefront.checkout_order (session_key, total_amount)
            VALUES ($1, $2)
            RETURNING id, session_key, total_amount, created_at
            ",
        )
        .bind(session_key)
        .bind(total_amount)
        .fetch_one(self.pool())
        .await?;

        info!(order_id = %row.id, "Order recorded");
        Ok(Order::from(row))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, session_key, total_amount, created_at
            FROM storefront.checkout_order
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Order::from))
    }

    async fn list_recent_orders(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, session_key, total_amount, created_at
            FROM storefront.checkout_order
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(limit.max(0))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }
}
