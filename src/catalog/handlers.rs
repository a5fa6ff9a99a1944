use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    catalog::{
        aggregate::fold_product_rows,
        dto::{CategoriesResponse, CategoryKey, CategoryResponse, ListProductsParams, ProductResponse},
        repo::{self, NewProduct},
    },
    error::ApiError,
    state::AppState,
};

const MAX_IMAGES: usize = 3;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/:id", get(get_product).delete(delete_product))
        .route("/api/deals", get(list_deals))
        .route("/api/categories", get(list_categories))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", post(create_product))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListProductsParams>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let rows = repo::list_with_images(&state.db, params.category_id, search).await?;
    Ok(Json(fold_product_rows(rows)))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>, ApiError> {
    let rows = repo::get_with_images(&state.db, id).await?;
    let product = fold_product_rows(rows)
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn list_deals(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let rows = repo::list_deals(&state.db).await?;
    Ok(Json(fold_product_rows(rows)))
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = repo::list_categories(&state.db)
        .await?
        .into_iter()
        .map(|c| CategoryResponse {
            id: c.id,
            slug: c.slug,
            name: c.name,
        })
        .collect();
    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}

/// POST /api/products (multipart): title, description, price, category slug,
/// isNew, images[] up to three files.
#[instrument(skip(state, multipart))]
pub async fn create_product(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut title = String::new();
    let mut description = String::new();
    let mut price_text = String::new();
    let mut category_text = String::new();
    let mut is_new = false;
    let mut images: Vec<Vec<u8>> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("title") => title = read_text(field).await?,
            Some("description") => description = read_text(field).await?,
            Some("price") => price_text = read_text(field).await?,
            Some("category") => category_text = read_text(field).await?,
            Some("isNew") => is_new = parse_bool(&read_text(field).await?),
            Some("images") | Some("images[]") => {
                if images.len() >= MAX_IMAGES {
                    return Err(ApiError::validation("Too many images"));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Invalid image upload: {e}")))?;
                images.push(bytes.to_vec());
            }
            _ => {}
        }
    }

    if title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }
    if images.is_empty() {
        return Err(ApiError::validation("No images uploaded"));
    }
    let price: Decimal = price_text
        .trim()
        .parse()
        .map_err(|_| ApiError::validation("Invalid price"))?;
    let key = CategoryKey::parse(category_text.trim())
        .ok_or_else(|| ApiError::validation("Unknown category"))?;

    let category_id = repo::category_id_by_slug(&state.db, key.as_slug())
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("seeded category missing")))?;

    let input = NewProduct {
        title,
        description,
        price,
        is_new,
        category_id,
        images,
    };
    let product_id = repo::create_with_images(&state.db, &input).await?;

    info!(product_id, images = input.images.len(), "product created");
    Ok(Json(
        json!({ "success": true, "message": "Product and images added successfully" }),
    ))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !repo::delete_product(&state.db, id).await? {
        return Err(ApiError::not_found("Product not found"));
    }
    info!(product_id = id, "product deleted");
    Ok(Json(json!({ "success": true, "message": "Product deleted" })))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid form field: {e}")))
}

fn parse_bool(s: &str) -> bool {
    matches!(s.trim(), "true" | "1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_new_accepts_common_truthy_forms() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(parse_bool(" true "));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool(""));
        assert!(!parse_bool("yes"));
    }
}
