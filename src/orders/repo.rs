use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use tracing::error;

use crate::error::ApiError;
use crate::orders::dto::{OrderStatus, PlaceOrderRequest};

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub total_price: Decimal,
    pub status: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub customer_name: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
    pub product_id: i64,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
}

/// Place an order atomically: order header, one row per line item, and the
/// cart purge either all become visible or none do. Any failure inside the
/// scope rolls the whole thing back and surfaces a single opaque error.
pub async fn place_order(db: &PgPool, input: &PlaceOrderRequest) -> Result<i64, ApiError> {
    let mut tx = db.begin().await?;

    match insert_order(&mut tx, input).await {
        Ok(order_id) => match tx.commit().await {
            Ok(()) => Ok(order_id),
            Err(e) => {
                error!(error = %e, "order commit failed");
                Err(ApiError::TransactionFailure("Failed to place order"))
            }
        },
        Err(e) => {
            error!(error = %e, "order placement aborted, rolling back");
            if let Err(e) = tx.rollback().await {
                error!(error = %e, "order rollback failed");
            }
            Err(ApiError::TransactionFailure("Failed to place order"))
        }
    }
}

async fn insert_order(
    tx: &mut Transaction<'_, Postgres>,
    input: &PlaceOrderRequest,
) -> Result<i64, sqlx::Error> {
    let order_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO orders (user_id, total_price, status, phone, location, email, customer_name)
        VALUES ($1, $2, 'pending', $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(input.user_id)
    .bind(input.total_price)
    .bind(input.phone.as_deref())
    .bind(input.location.as_deref())
    .bind(input.email.as_deref())
    .bind(input.name.as_deref())
    .fetch_one(&mut **tx)
    .await?;

    for item in &input.items {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price_at_purchase)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price_at_purchase)
        .execute(&mut **tx)
        .await?;
    }

    // Guest orders have no cart rows to purge.
    if let Some(user_id) = input.user_id {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(order_id)
}

pub async fn get_with_items(
    db: &PgPool,
    order_id: i64,
) -> Result<Option<(OrderRow, Vec<OrderItemRow>)>, ApiError> {
    let order = sqlx::query_as::<_, OrderRow>(
        r#"
        SELECT id, user_id, total_price, status, phone, location, email,
               customer_name, created_at
        FROM orders
        WHERE id = $1
        "#,
    )
    .bind(order_id)
    .fetch_optional(db)
    .await?;

    let Some(order) = order else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, OrderItemRow>(
        r#"
        SELECT product_id, quantity, price_at_purchase
        FROM order_items
        WHERE order_id = $1
        ORDER BY id
        "#,
    )
    .bind(order_id)
    .fetch_all(db)
    .await?;

    Ok(Some((order, items)))
}

pub async fn list_by_user(db: &PgPool, user_id: i64) -> Result<Vec<OrderRow>, ApiError> {
    let rows = sqlx::query_as::<_, OrderRow>(
        r#"
        SELECT id, user_id, total_price, status, phone, location, email,
               customer_name, created_at
        FROM orders
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn update_status(
    db: &PgPool,
    order_id: i64,
    status: OrderStatus,
) -> Result<bool, ApiError> {
    let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
        .bind(order_id)
        .bind(status.as_str())
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
