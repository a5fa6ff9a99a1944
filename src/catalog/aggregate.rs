use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::dto::ProductResponse;
use super::repo::ProductImageRow;

pub fn data_uri(image: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(image))
}

/// Fold a flat one-row-per-image join result into one object per distinct
/// product id, in first-seen order. Every non-null image row appends to that
/// product's `images` list; a product with no images keeps an empty list.
pub fn fold_product_rows(rows: Vec<ProductImageRow>) -> Vec<ProductResponse> {
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut out: Vec<ProductResponse> = Vec::new();

    for row in rows {
        let ProductImageRow {
            id,
            title,
            description,
            price,
            is_new,
            category,
            image,
        } = row;

        let idx = *index.entry(id).or_insert_with(|| {
            out.push(ProductResponse {
                id,
                title,
                description,
                price,
                is_new,
                category,
                images: Vec::new(),
            });
            out.len() - 1
        });

        if let Some(bytes) = image {
            out[idx].images.push(data_uri(&bytes));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn row(id: i64, title: &str, image: Option<&[u8]>) -> ProductImageRow {
        ProductImageRow {
            id,
            title: title.to_string(),
            description: format!("{title} description"),
            price: Decimal::new(1999, 2),
            is_new: false,
            category: "other".to_string(),
            image: image.map(<[u8]>::to_vec),
        }
    }

    #[test]
    fn folds_join_rows_into_one_object_per_product() {
        let rows = vec![
            row(7, "desk lamp", Some(b"jpeg-one")),
            row(7, "desk lamp", Some(b"jpeg-two")),
            row(7, "desk lamp", None),
            row(9, "bookshelf", None),
        ];

        let folded = fold_product_rows(rows);

        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0].id, 7);
        assert_eq!(folded[0].images.len(), 2);
        assert_eq!(folded[1].id, 9);
        assert!(folded[1].images.is_empty());
    }

    #[test]
    fn preserves_first_seen_order_with_interleaved_rows() {
        let rows = vec![
            row(7, "desk lamp", Some(b"a")),
            row(9, "bookshelf", Some(b"b")),
            row(7, "desk lamp", Some(b"c")),
        ];

        let folded = fold_product_rows(rows);

        let ids: Vec<i64> = folded.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![7, 9]);
        assert_eq!(folded[0].images.len(), 2);
        assert_eq!(folded[1].images.len(), 1);
    }

    #[test]
    fn zero_image_product_yields_empty_list_not_null() {
        let folded = fold_product_rows(vec![row(3, "mug", None)]);
        let json = serde_json::to_value(&folded[0]).unwrap();
        assert_eq!(json["images"], serde_json::json!([]));
    }

    #[test]
    fn data_uri_decodes_back_to_original_bytes() {
        let original: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        let uri = data_uri(original);

        let payload = uri
            .strip_prefix("data:image/jpeg;base64,")
            .expect("data uri prefix");
        assert_eq!(STANDARD.decode(payload).unwrap(), original);
    }
}
