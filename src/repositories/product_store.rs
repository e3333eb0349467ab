use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use super::db::{StoredEntity, group_links, realign_sequence};
use crate::models::{Entity, NewProductRow, Product, ProductCategoryLink, ProductRow};
use crate::schema::{product_categories, products};

#[async_trait]
impl StoredEntity for Product {
    async fn insert(conn: &mut AsyncPgConnection, item: &Self) -> QueryResult<Self> {
        let row: ProductRow = diesel::insert_into(products::table)
            .values(NewProductRow::from(item))
            .returning(ProductRow::as_returning())
            .get_result(conn)
            .await?;

        if item.has_assigned_id() {
            realign_sequence(conn, "products").await?;
        }

        let links: Vec<ProductCategoryLink> = item
            .category_ids
            .iter()
            .map(|&category_id| ProductCategoryLink {
                product_id: row.id,
                category_id,
            })
            .collect();
        if !links.is_empty() {
            diesel::insert_into(product_categories::table)
                .values(&links)
                .execute(conn)
                .await?;
        }

        Ok(row.into_product(item.category_ids.clone()))
    }

    async fn find(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<Option<Self>> {
        let Some(row) = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(conn)
            .await
            .optional()?
        else {
            return Ok(None);
        };

        let category_ids = product_categories::table
            .filter(product_categories::product_id.eq(id))
            .select(product_categories::category_id)
            .order(product_categories::category_id.asc())
            .load::<i32>(conn)
            .await?;

        Ok(Some(row.into_product(category_ids)))
    }

    async fn remove(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<usize> {
        diesel::delete(products::table.find(id)).execute(conn).await
    }

    async fn page_after(
        conn: &mut AsyncPgConnection,
        after: i32,
        limit: i64,
    ) -> QueryResult<Vec<Self>> {
        let rows: Vec<ProductRow> = products::table
            .filter(products::id.gt(after))
            .order(products::id.asc())
            .limit(limit)
            .select(ProductRow::as_select())
            .load(conn)
            .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let pairs = product_categories::table
            .filter(product_categories::product_id.eq_any(ids))
            .select((product_categories::product_id, product_categories::category_id))
            .load::<(i32, i32)>(conn)
            .await?;
        let mut links = group_links(pairs);

        Ok(rows
            .into_iter()
            .map(|row| {
                let category_ids = links.remove(&row.id).unwrap_or_default();
                row.into_product(category_ids)
            })
            .collect())
    }
}
