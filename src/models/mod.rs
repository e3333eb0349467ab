mod category;
mod decimal;
mod entity;
mod product;

pub use category::{Category, CategoryRow, NewCategoryRow, ProductCategoryLink};
pub use entity::{Entity, UNASSIGNED_ID, normalize_ids};
pub use product::{NewProductRow, Product, ProductRow};
