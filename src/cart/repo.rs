use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::error::ApiError;

#[derive(Debug, Clone, FromRow)]
pub struct CartLineRow {
    pub id: i64,
    pub product_id: i64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub total_price: Decimal,
    pub image: Option<Vec<u8>>,
}

/// Live product fields copied into the cart line at add time.
#[derive(Debug, Clone, FromRow)]
pub struct ProductSnapshot {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<Vec<u8>>,
}

pub async fn product_snapshot(
    db: &PgPool,
    product_id: i64,
) -> Result<Option<ProductSnapshot>, ApiError> {
    let snapshot = sqlx::query_as::<_, ProductSnapshot>(
        r#"
        SELECT p.title, p.description, p.price,
               (SELECT pi.image
                FROM product_images pi
                WHERE pi.product_id = p.id
                ORDER BY pi.id
                LIMIT 1) AS image
        FROM products p
        WHERE p.id = $1
        "#,
    )
    .bind(product_id)
    .fetch_optional(db)
    .await?;
    Ok(snapshot)
}

/// Insert a new line or merge into the existing one for (user, product).
/// Concurrent adds serialize on the uniqueness constraint.
pub async fn upsert_line(
    db: &PgPool,
    user_id: i64,
    product_id: i64,
    snapshot: &ProductSnapshot,
    quantity: i32,
    total_price: Decimal,
) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        INSERT INTO cart_items
            (user_id, product_id, title, description, price, image, quantity, total_price)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id, product_id) DO UPDATE
            SET quantity = cart_items.quantity + EXCLUDED.quantity,
                total_price = EXCLUDED.total_price
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(&snapshot.title)
    .bind(&snapshot.description)
    .bind(snapshot.price)
    .bind(snapshot.image.as_deref())
    .bind(quantity)
    .bind(total_price)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn list_for_user(db: &PgPool, user_id: i64) -> Result<Vec<CartLineRow>, ApiError> {
    let rows = sqlx::query_as::<_, CartLineRow>(
        r#"
        SELECT id, product_id, title, description, price, quantity, total_price, image
        FROM cart_items
        WHERE user_id = $1
        ORDER BY created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn remove_line(db: &PgPool, user_id: i64, product_id: i64) -> Result<bool, ApiError> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
        .bind(user_id)
        .bind(product_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
