use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::entity::{Entity, UNASSIGNED_ID, normalize_ids};

/// Category grouping any number of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category id; `0` or absent lets the backend generate one
    #[serde(default)]
    #[validate(range(min = 0, message = "Id must not be negative"))]
    pub id: i32,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    #[schema(min_length = 1, max_length = 255)]
    pub name: String,
    /// Ids of the products in this category
    #[serde(default)]
    pub product_ids: Vec<i32>,
}

impl Entity for Category {
    const NAME: &'static str = "category";

    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    fn normalize(&mut self) {
        normalize_ids(&mut self.product_ids);
    }
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    pub id: i32,
    pub name: String,
}

impl CategoryRow {
    pub fn into_category(self, product_ids: Vec<i32>) -> Category {
        Category {
            id: self.id,
            name: self.name,
            product_ids,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategoryRow<'a> {
    pub id: Option<i32>,
    pub name: &'a str,
}

impl<'a> From<&'a Category> for NewCategoryRow<'a> {
    fn from(category: &'a Category) -> Self {
        Self {
            id: (category.id != UNASSIGNED_ID).then_some(category.id),
            name: &category.name,
        }
    }
}

/// One edge of the product/category relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Insertable)]
#[diesel(table_name = crate::schema::product_categories)]
pub struct ProductCategoryLink {
    pub product_id: i32,
    pub category_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_defaults() {
        let category: Category = serde_json::from_str(r#"{"name":"Tools"}"#).unwrap();
        assert_eq!(category.id, 0);
        assert_eq!(category.name, "Tools");
        assert!(category.product_ids.is_empty());
        assert!(!category.has_assigned_id());
    }

    #[test]
    fn test_validate_empty_name() {
        let category = Category {
            id: 0,
            name: String::new(),
            product_ids: vec![],
        };
        assert!(category.validate().is_err());
    }

    #[test]
    fn test_validate_name_fits_column() {
        let mut category = Category {
            id: 0,
            name: "n".repeat(255),
            product_ids: vec![],
        };
        assert!(category.validate().is_ok());

        category.name.push('n');
        assert!(category.validate().unwrap_err().field_errors().contains_key("name"));
    }

    #[test]
    fn test_serialize_product_ids_camel_case() {
        let category = Category {
            id: 3,
            name: "Tools".to_string(),
            product_ids: vec![1, 2],
        };
        let value = serde_json::to_value(&category).unwrap();
        assert_eq!(value["productIds"], serde_json::json!([1, 2]));
        assert_eq!(value["id"], 3);
    }
}
