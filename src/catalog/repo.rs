use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::error::ApiError;

/// One row of the product × image left join. `image` is NULL for products
/// without images.
#[derive(Debug, Clone, FromRow)]
pub struct ProductImageRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub is_new: bool,
    pub category: String,
    pub image: Option<Vec<u8>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub is_new: bool,
    pub category_id: i64,
    pub images: Vec<Vec<u8>>,
}

const PRODUCT_JOIN: &str = r#"
    SELECT p.id, p.title, p.description, p.price, p.is_new,
           c.slug AS category, pi.image
    FROM products p
    JOIN categories c ON c.id = p.category_id
    LEFT JOIN product_images pi ON pi.product_id = p.id
"#;

pub async fn list_with_images(
    db: &PgPool,
    category_id: Option<i64>,
    search: Option<&str>,
) -> Result<Vec<ProductImageRow>, ApiError> {
    let sql = format!(
        r#"{PRODUCT_JOIN}
        WHERE ($1::BIGINT IS NULL OR p.category_id = $1)
          AND ($2::TEXT IS NULL
               OR p.title ILIKE '%' || $2 || '%'
               OR p.description ILIKE '%' || $2 || '%')
        ORDER BY p.id, pi.id
        "#
    );
    let rows = sqlx::query_as::<_, ProductImageRow>(&sql)
        .bind(category_id)
        .bind(search)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn get_with_images(db: &PgPool, id: i64) -> Result<Vec<ProductImageRow>, ApiError> {
    let sql = format!("{PRODUCT_JOIN} WHERE p.id = $1 ORDER BY pi.id");
    let rows = sqlx::query_as::<_, ProductImageRow>(&sql)
        .bind(id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn list_deals(db: &PgPool) -> Result<Vec<ProductImageRow>, ApiError> {
    let sql = format!("{PRODUCT_JOIN} WHERE p.is_new ORDER BY p.id, pi.id");
    let rows = sqlx::query_as::<_, ProductImageRow>(&sql)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn category_id_by_slug(db: &PgPool, slug: &str) -> Result<Option<i64>, ApiError> {
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(db)
        .await?;
    Ok(id)
}

pub async fn list_categories(db: &PgPool) -> Result<Vec<CategoryRow>, ApiError> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, slug, name FROM categories ORDER BY id",
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Insert the product row and its image rows in one transaction. The
/// transaction rolls back on drop if any insert fails.
pub async fn create_with_images(db: &PgPool, input: &NewProduct) -> Result<i64, ApiError> {
    let mut tx = db.begin().await?;

    let product_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO products (title, description, price, is_new, category_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.price)
    .bind(input.is_new)
    .bind(input.category_id)
    .fetch_one(&mut *tx)
    .await?;

    for image in &input.images {
        sqlx::query("INSERT INTO product_images (product_id, image) VALUES ($1, $2)")
            .bind(product_id)
            .bind(image.as_slice())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(product_id)
}

pub async fn delete_product(db: &PgPool, id: i64) -> Result<bool, ApiError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
