use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    error::ApiError,
    orders::{
        dto::{
            OrderDetails, OrderEnvelope, OrderItemDetails, OrderStatus, OrderSummary,
            OrdersEnvelope, PlaceOrderRequest, PlaceOrderResponse, UpdateStatusRequest,
        },
        repo::{self, OrderRow},
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", post(place_order))
        .route("/api/orders/:order_id", get(get_order))
        .route("/api/orders/:order_id/status", put(update_status))
        .route("/api/orders/user/:user_id", get(list_user_orders))
}

fn validate_order(payload: &PlaceOrderRequest) -> Result<(), ApiError> {
    if payload.items.is_empty() {
        return Err(ApiError::validation("Order must contain at least one item"));
    }
    if payload.items.iter().any(|item| item.quantity <= 0) {
        return Err(ApiError::validation("Item quantity must be positive"));
    }
    Ok(())
}

fn row_status(row: &OrderRow) -> Result<OrderStatus, ApiError> {
    OrderStatus::parse(&row.status)
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("unexpected order status in storage")))
}

#[instrument(skip(state, payload))]
pub async fn place_order(
    State(state): State<AppState>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderResponse>, ApiError> {
    validate_order(&payload)?;

    let order_id = repo::place_order(&state.db, &payload).await?;

    info!(order_id, items = payload.items.len(), "order placed");
    Ok(Json(PlaceOrderResponse {
        success: true,
        order_id,
    }))
}

#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    let (order, items) = repo::get_with_items(&state.db, order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;

    let status = row_status(&order)?;
    Ok(Json(OrderEnvelope {
        success: true,
        order: OrderDetails {
            id: order.id,
            user_id: order.user_id,
            total_price: order.total_price,
            status,
            phone: order.phone,
            location: order.location,
            email: order.email,
            name: order.customer_name,
            created_at: order.created_at,
            items: items
                .into_iter()
                .map(|item| OrderItemDetails {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price_at_purchase: item.price_at_purchase,
                })
                .collect(),
        },
    }))
}

#[instrument(skip(state))]
pub async fn list_user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<OrdersEnvelope>, ApiError> {
    let rows = repo::list_by_user(&state.db, user_id).await?;

    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        let status = row_status(&row)?;
        orders.push(OrderSummary {
            id: row.id,
            user_id: row.user_id,
            total_price: row.total_price,
            status,
            created_at: row.created_at,
        });
    }
    Ok(Json(OrdersEnvelope {
        success: true,
        orders,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let status = OrderStatus::parse(payload.status.trim())
        .ok_or_else(|| ApiError::validation("Unknown order status"))?;

    if !repo::update_status(&state.db, order_id, status).await? {
        return Err(ApiError::not_found("Order not found"));
    }

    info!(order_id, status = status.as_str(), "order status updated");
    Ok(Json(json!({ "success": true, "message": "Order updated" })))
}
