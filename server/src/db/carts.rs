//! Database operations for the carts table.

use sqlx::{PgPool, Row};
use trolley_engine::{decode_cart, Cart};

/// A stored cart row from the database.
#[derive(Debug)]
pub struct StoredCart {
    pub account_id: String,
    pub items: serde_json::Value,
    pub updated_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredCart {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StoredCart {
            account_id: row.try_get("account_id")?,
            items: row.try_get("items")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl StoredCart {
    /// Convert the stored JSON into an engine cart.
    ///
    /// An unreadable payload decodes to an empty cart rather than failing
    /// the request; the row stays untouched until the next write.
    pub fn to_cart(&self) -> Cart {
        match decode_cart(&self.items) {
            Ok(cart) => cart,
            Err(e) => {
                tracing::warn!(
                    account = %self.account_id,
                    "Stored cart is unreadable, treating as empty: {}",
                    e
                );
                Cart::new()
            }
        }
    }
}

/// Upsert the cart for an account.
pub async fn upsert_cart(
    pool: &PgPool,
    account_id: &str,
    cart: &Cart,
    updated_at: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO carts (account_id, items, updated_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (account_id) DO UPDATE SET
            items = EXCLUDED.items,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(account_id)
    .bind(sqlx::types::Json(cart))
    .bind(updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the cart stored for an account.
pub async fn get_cart(pool: &PgPool, account_id: &str) -> Result<Option<StoredCart>, sqlx::Error> {
    sqlx::query_as::<_, StoredCart>(
        r#"
        SELECT account_id, items, updated_at
        FROM carts
        WHERE account_id = $1
        "#,
    )
    .bind(account_id)
    .fetch_optional(pool)
    .await
}

/// Delete the cart stored for an account. Returns true when a row existed.
pub async fn delete_cart(pool: &PgPool, account_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM carts WHERE account_id = $1")
        .bind(account_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
