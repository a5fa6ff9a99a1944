use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One aggregated catalog entry: scalar product fields plus every image of
/// the product as a base64 data-URI, in row-arrival order.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub is_new: bool,
    pub category: String,
    pub images: Vec<String>,
}

/// Query parameters of the merged listing endpoint. Both filters are
/// optional and combine with AND when both are present.
#[derive(Debug, Deserialize)]
pub struct ListProductsParams {
    #[serde(rename = "categoryId")]
    pub category_id: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: Vec<CategoryResponse>,
}

/// Closed set of category keys accepted from clients. Anything outside this
/// list never reaches SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKey {
    Electronics,
    Clothing,
    Furniture,
    Cosmetics,
    Groceries,
    Other,
}

impl CategoryKey {
    pub fn as_slug(self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Clothing => "clothing",
            Self::Furniture => "furniture",
            Self::Cosmetics => "cosmetics",
            Self::Groceries => "groceries",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "electronics" => Some(Self::Electronics),
            "clothing" => Some(Self::Clothing),
            "furniture" => Some(Self::Furniture),
            "cosmetics" => Some(Self::Cosmetics),
            "groceries" => Some(Self::Groceries),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_keys_roundtrip_through_slugs() {
        for key in [
            CategoryKey::Electronics,
            CategoryKey::Clothing,
            CategoryKey::Furniture,
            CategoryKey::Cosmetics,
            CategoryKey::Groceries,
            CategoryKey::Other,
        ] {
            assert_eq!(CategoryKey::parse(key.as_slug()), Some(key));
        }
    }

    #[test]
    fn unknown_slugs_are_rejected() {
        assert_eq!(CategoryKey::parse("toys"), None);
        assert_eq!(CategoryKey::parse(""), None);
        assert_eq!(CategoryKey::parse("products; DROP TABLE products"), None);
    }

    #[test]
    fn list_params_accept_camel_case_category_id() {
        let params: ListProductsParams =
            serde_json::from_str(r#"{"categoryId": 3, "search": "lamp"}"#).unwrap();
        assert_eq!(params.category_id, Some(3));
        assert_eq!(params.search.as_deref(), Some("lamp"));
    }
}
