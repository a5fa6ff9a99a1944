use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Lifecycle of an order. Exactly one of these at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderLineInput {
    pub product_id: i64,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
}

/// Request body for order placement. `user_id` is absent for guest checkout.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<OrderLineInput>,
    pub total_price: Decimal,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub order_id: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderSummary {
    pub id: i64,
    pub user_id: Option<i64>,
    pub total_price: Decimal,
    pub status: OrderStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct OrderItemDetails {
    pub product_id: i64,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OrderDetails {
    pub id: i64,
    pub user_id: Option<i64>,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub items: Vec<OrderItemDetails>,
}

#[derive(Debug, Serialize)]
pub struct OrderEnvelope {
    pub success: bool,
    pub order: OrderDetails,
}

#[derive(Debug, Serialize)]
pub struct OrdersEnvelope {
    pub success: bool,
    pub orders: Vec<OrderSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrips_through_its_string_form() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn unknown_status_strings_are_rejected() {
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::parse("PENDING"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"pending\""
        );
    }

    #[test]
    fn missing_items_deserialize_as_empty_list() {
        let body = r#"{"total_price": "19.99", "phone": "0700000000"}"#;
        let parsed: PlaceOrderRequest = serde_json::from_str(body).unwrap();
        assert!(parsed.items.is_empty());
        assert!(parsed.user_id.is_none());
    }

    #[test]
    fn place_order_response_shape() {
        let json = serde_json::to_value(PlaceOrderResponse {
            success: true,
            order_id: 17,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "order_id": 17 }));
    }
}
