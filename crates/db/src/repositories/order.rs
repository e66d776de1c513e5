use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use orderdesk_core::domain::customer::CustomerId;
use orderdesk_core::domain::order::{Order, OrderId};
use orderdesk_core::pagination::{Page, PageRequest};

use super::{count_to_u64, parse_timestamp, sql_range, OrderRepository, RepositoryError};
use crate::DbPool;

const ORDER_COLUMNS: &str = "order_id, user_id, status, created_at, num_of_item";

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_order(row: &SqliteRow) -> Result<Order, RepositoryError> {
    let decode = |e: sqlx::Error| RepositoryError::Decode(e.to_string());
    let created_at: String = row.try_get("created_at").map_err(decode)?;

    Ok(Order {
        order_id: OrderId(row.try_get("order_id").map_err(decode)?),
        user_id: CustomerId(row.try_get("user_id").map_err(decode)?),
        status: row.try_get("status").map_err(decode)?,
        created_at: parse_timestamp("orders.created_at", &created_at)?,
        num_of_item: row.try_get("num_of_item").map_err(decode)?,
    })
}

#[async_trait::async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn list_for_customer(
        &self,
        customer: CustomerId,
        request: &PageRequest,
    ) -> Result<Page<Order>, RepositoryError> {
        let (limit, offset) = sql_range(request);

        // Stored text may carry any RFC 3339 offset or fraction, so sort on the instant.
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 \
             ORDER BY julianday(created_at) DESC, order_id DESC LIMIT ?2 OFFSET ?3"
        ))
        .bind(customer.0)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = self.count_for_customer(customer).await?;
        let items = rows.iter().map(row_to_order).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total))
    }

    async fn count_for_customer(&self, customer: CustomerId) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?1")
            .bind(customer.0)
            .fetch_one(&self.pool)
            .await?;
        count_to_u64(count)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = ?1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_order).transpose()
    }
}
