use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use super::db::{StoredEntity, group_links, realign_sequence};
use crate::models::{Category, CategoryRow, Entity, NewCategoryRow, ProductCategoryLink};
use crate::schema::{categories, product_categories};

#[async_trait]
impl StoredEntity for Category {
    async fn insert(conn: &mut AsyncPgConnection, item: &Self) -> QueryResult<Self> {
        let row: CategoryRow = diesel::insert_into(categories::table)
            .values(NewCategoryRow::from(item))
            .returning(CategoryRow::as_returning())
            .get_result(conn)
            .await?;

        if item.has_assigned_id() {
            realign_sequence(conn, "categories").await?;
        }

        let links: Vec<ProductCategoryLink> = item
            .product_ids
            .iter()
            .map(|&product_id| ProductCategoryLink {
                product_id,
                category_id: row.id,
            })
            .collect();
        if !links.is_empty() {
            diesel::insert_into(product_categories::table)
                .values(&links)
                .execute(conn)
                .await?;
        }

        Ok(row.into_category(item.product_ids.clone()))
    }

    async fn find(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<Option<Self>> {
        let Some(row) = categories::table
            .find(id)
            .select(CategoryRow::as_select())
            .first(conn)
            .await
            .optional()?
        else {
            return Ok(None);
        };

        let product_ids = product_categories::table
            .filter(product_categories::category_id.eq(id))
            .select(product_categories::product_id)
            .order(product_categories::product_id.asc())
            .load::<i32>(conn)
            .await?;

        Ok(Some(row.into_category(product_ids)))
    }

    async fn remove(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<usize> {
        diesel::delete(categories::table.find(id)).execute(conn).await
    }

    async fn page_after(
        conn: &mut AsyncPgConnection,
        after: i32,
        limit: i64,
    ) -> QueryResult<Vec<Self>> {
        let rows: Vec<CategoryRow> = categories::table
            .filter(categories::id.gt(after))
            .order(categories::id.asc())
            .limit(limit)
            .select(CategoryRow::as_select())
            .load(conn)
            .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let pairs = product_categories::table
            .filter(product_categories::category_id.eq_any(ids))
            .select((product_categories::category_id, product_categories::product_id))
            .load::<(i32, i32)>(conn)
            .await?;
        let mut links = group_links(pairs);

        Ok(rows
            .into_iter()
            .map(|row| {
                let product_ids = links.remove(&row.id).unwrap_or_default();
                row.into_category(product_ids)
            })
            .collect())
    }
}
