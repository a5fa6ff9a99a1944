use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request body for adding a product to the cart. Fields are optional at the
/// serde level so that missing ones produce the standard validation envelope
/// instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub user_id: Option<i64>,
    pub item_id: Option<i64>,
    pub quantity: Option<i32>,
    pub total_price: Option<Decimal>,
}

/// One cart line as returned to the client. Scalar fields are the snapshot
/// taken when the line was created; `image` is a base64 data-URI.
#[derive(Debug, Serialize)]
pub struct CartLineResponse {
    pub cart_id: i64,
    pub product_id: i64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub total_price: Decimal,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    pub cart: Vec<CartLineResponse>,
}
