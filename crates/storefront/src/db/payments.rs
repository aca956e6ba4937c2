//! Payment method repository for `PostgreSQL`.

use async_trait::async_trait;
use tracing::{debug, instrument};

use servicecart_core::{PaymentMethod, PaymentMethodId};

use super::{CatalogWriter, PaymentMethodStore, PgStore, RepositoryError};
use crate::models::NewPaymentMethod;

#[derive(sqlx::FromRow)]
struct PaymentMethodRow {
    id: PaymentMethodId,
    name: String,
    code: String,
    is_enabled: bool,
    is_visible: bool,
    sort_order: i32,
}

impl From<PaymentMethodRow> for PaymentMethod {
    fn from(row: PaymentMethodRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            code: row.code,
            is_enabled: row.is_enabled,
            is_visible: row.is_visible,
            sort_order: row.sort_order,
        }
    }
}

#[async_trait]
impl PaymentMethodStore for PgStore {
    async fn list_visible_payment_methods(&self) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentMethodRow>(
            r"
            SELECT id, name, code, is_enabled, is_visible, sort_order
            FROM storefront.payment_method
            WHERE is_visible
            ORDER BY sort_order, name
            ",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(PaymentMethod::from).collect())
    }

    async fn get_payment_method_by_code(
        &self,
        code: &str,
    ) -> Result<Option<PaymentMethod>, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentMethodRow>(
            r"
            SELECT id, name, code, is_enabled, is_visible, sort_order
            FROM storefront.payment_method
            WHERE code = $1
            ",
        )
        .bind(code)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(PaymentMethod::from))
    }
}

impl CatalogWriter {
    /// Create a payment method.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code is already taken.
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create_payment_method(
        &mut self,
        input: &NewPaymentMethod,
    ) -> Result<PaymentMethod, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentMethodRow>(
            r"
            INSERT INTO storefront.payment_method
                (name, code, is_enabled, is_visible, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, code, is_enabled, is_visible, sort_order
            ",
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(input.is_enabled)
        .bind(input.is_visible)
        .bind(input.sort_order)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "payment method"))?;

        debug!(id = %row.id, "Inserted payment method");
        Ok(PaymentMethod::from(row))
    }

    /// Delete every payment method.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear_payment_methods(&mut self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.payment_method")
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }
}
