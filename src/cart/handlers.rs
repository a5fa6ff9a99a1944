use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    cart::{
        dto::{AddToCartRequest, CartLineResponse, CartResponse},
        repo,
    },
    catalog::aggregate::data_uri,
    error::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart/add", post(add_to_cart))
        .route("/cart/:user_id", get(get_cart))
        .route("/cart/:user_id/:item_id", delete(remove_from_cart))
}

fn line_total(price: Decimal, quantity: i32, override_total: Option<Decimal>) -> Decimal {
    override_total.unwrap_or_else(|| price * Decimal::from(quantity))
}

fn validate_add(payload: &AddToCartRequest) -> Result<(i64, i64, i32), ApiError> {
    let (Some(user_id), Some(item_id), Some(quantity)) =
        (payload.user_id, payload.item_id, payload.quantity)
    else {
        return Err(ApiError::validation(
            "user_id, item_id and quantity are required",
        ));
    };
    if quantity <= 0 {
        return Err(ApiError::validation("Quantity must be positive"));
    }
    Ok((user_id, item_id, quantity))
}

#[instrument(skip(state, payload))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<Json<Value>, ApiError> {
    let (user_id, item_id, quantity) = validate_add(&payload)?;

    let snapshot = repo::product_snapshot(&state.db, item_id)
        .await?
        .ok_or_else(|| {
            warn!(product_id = item_id, "cart add for unknown product");
            ApiError::not_found("Product not found")
        })?;

    let total = line_total(snapshot.price, quantity, payload.total_price);
    repo::upsert_line(&state.db, user_id, item_id, &snapshot, quantity, total).await?;

    info!(user_id, product_id = item_id, quantity, "cart line upserted");
    Ok(Json(json!({ "success": true, "message": "Item added to cart" })))
}

#[instrument(skip(state))]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = repo::list_for_user(&state.db, user_id)
        .await?
        .into_iter()
        .map(|row| CartLineResponse {
            cart_id: row.id,
            product_id: row.product_id,
            title: row.title,
            description: row.description,
            price: row.price,
            quantity: row.quantity,
            total_price: row.total_price,
            image: row.image.as_deref().map(data_uri),
        })
        .collect();
    Ok(Json(CartResponse {
        success: true,
        cart,
    }))
}

#[instrument(skip(state))]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, ApiError> {
    if !repo::remove_line(&state.db, user_id, item_id).await? {
        return Err(ApiError::not_found("Cart item not found"));
    }
    info!(user_id, product_id = item_id, "cart line removed");
    Ok(Json(
        json!({ "success": true, "message": "Item removed from cart" }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user_id: Option<i64>, item_id: Option<i64>, quantity: Option<i32>) -> AddToCartRequest {
        AddToCartRequest {
            user_id,
            item_id,
            quantity,
            total_price: None,
        }
    }

    #[test]
    fn missing_fields_fail_validation_without_io() {
        assert!(matches!(
            validate_add(&request(None, Some(2), Some(1))),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            validate_add(&request(Some(1), None, Some(1))),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            validate_add(&request(Some(1), Some(2), None)),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        assert!(matches!(
            validate_add(&request(Some(1), Some(2), Some(0))),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            validate_add(&request(Some(1), Some(2), Some(-3))),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn valid_input_passes_through() {
        let (user_id, item_id, quantity) =
            validate_add(&request(Some(7), Some(9), Some(2))).unwrap();
        assert_eq!((user_id, item_id, quantity), (7, 9, 2));
    }

    #[test]
    fn line_total_defaults_to_price_times_quantity() {
        let price = Decimal::new(1250, 2);
        assert_eq!(line_total(price, 3, None), Decimal::new(3750, 2));
    }

    #[test]
    fn explicit_total_overrides_the_computed_one() {
        let price = Decimal::new(1250, 2);
        let override_total = Decimal::new(3000, 2);
        assert_eq!(line_total(price, 3, Some(override_total)), override_total);
    }
}
