use bigdecimal::BigDecimal;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::entity::{Entity, UNASSIGNED_ID, normalize_ids};

/// Product as exposed over the API and stored by every backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product id; `0` or absent lets the backend generate one
    #[serde(default)]
    #[validate(range(min = 0, message = "Id must not be negative"))]
    pub id: i32,
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    #[schema(min_length = 1, max_length = 255)]
    pub title: String,
    #[serde(default, with = "super::decimal")]
    #[schema(value_type = f64)]
    pub price: BigDecimal,
    #[serde(default, with = "super::decimal")]
    #[schema(value_type = f64)]
    pub discounted_price: BigDecimal,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    /// Image reference (URL or file name)
    #[validate(length(min = 1, max = 2048, message = "Image must be between 1 and 2048 characters"))]
    #[schema(min_length = 1, max_length = 2048)]
    pub image: String,
    /// Ids of the categories this product belongs to
    #[serde(default)]
    pub category_ids: Vec<i32>,
}

impl Entity for Product {
    const NAME: &'static str = "product";

    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    fn normalize(&mut self) {
        normalize_ids(&mut self.category_ids);
    }
}

/// Product row for reading from the products table
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: i32,
    pub title: String,
    pub price: BigDecimal,
    pub discounted_price: BigDecimal,
    pub description: String,
    pub image: String,
}

impl ProductRow {
    /// Joins the row with its category ids.
    pub fn into_product(self, category_ids: Vec<i32>) -> Product {
        Product {
            id: self.id,
            title: self.title,
            price: self.price,
            discounted_price: self.discounted_price,
            description: self.description,
            image: self.image,
            category_ids,
        }
    }
}

/// Product row for inserting; a `None` id lets the serial column decide.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProductRow<'a> {
    pub id: Option<i32>,
    pub title: &'a str,
    pub price: &'a BigDecimal,
    pub discounted_price: &'a BigDecimal,
    pub description: &'a str,
    pub image: &'a str,
}

impl<'a> From<&'a Product> for NewProductRow<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            id: (product.id != UNASSIGNED_ID).then_some(product.id),
            title: &product.title,
            price: &product.price,
            discounted_price: &product.discounted_price,
            description: &product.description,
            image: &product.image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn widget() -> Product {
        Product {
            id: 0,
            title: "Widget".to_string(),
            price: BigDecimal::from_str("9.99").unwrap(),
            discounted_price: BigDecimal::from(0),
            description: "d".to_string(),
            image: "i.png".to_string(),
            category_ids: vec![],
        }
    }

    #[test]
    fn test_deserialize_minimal_body() {
        let json = r#"{"title":"Widget","price":9.99,"description":"d","image":"i.png"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 0);
        assert_eq!(product.title, "Widget");
        assert_eq!(product.discounted_price, BigDecimal::from(0));
        assert!(product.category_ids.is_empty());
    }

    #[test]
    fn test_deserialize_missing_title_fails() {
        let json = r#"{"price":1,"description":"d","image":"i.png"}"#;
        assert!(serde_json::from_str::<Product>(json).is_err());
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let value = serde_json::to_value(widget()).unwrap();
        assert!(value.get("discountedPrice").is_some());
        assert!(value.get("categoryIds").is_some());
        assert!(value.get("discounted_price").is_none());
    }

    #[test]
    fn test_validate_rejects_empty_required_strings() {
        let mut product = widget();
        product.title = String::new();
        product.image = String::new();
        let errors = product.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("image"));
        assert!(!fields.contains_key("description"));
    }

    #[test]
    fn test_validate_enforces_column_lengths() {
        let mut product = widget();
        product.title = "t".repeat(255);
        product.image = "i".repeat(2048);
        assert!(product.validate().is_ok());

        product.title.push('t');
        product.image.push('i');
        let errors = product.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("image"));
    }

    #[test]
    fn test_prices_round_trip_as_numbers() {
        let mut product = widget();
        product.discounted_price = BigDecimal::from_str("7.5").unwrap();
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["price"], serde_json::json!(9.99));
        assert_eq!(value["discountedPrice"], serde_json::json!(7.5));

        let back: Product = serde_json::from_value(value).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn test_validate_rejects_negative_id() {
        let mut product = widget();
        product.id = -4;
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_normalize_category_ids() {
        let mut product = widget();
        product.category_ids = vec![5, 2, 5];
        product.normalize();
        assert_eq!(product.category_ids, vec![2, 5]);
    }

    #[test]
    fn test_new_row_leaves_unassigned_id_to_database() {
        let product = widget();
        assert_eq!(NewProductRow::from(&product).id, None);

        let mut product = widget();
        product.id = 12;
        assert_eq!(NewProductRow::from(&product).id, Some(12));
    }
}
