use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use orderdesk_core::domain::customer::{Customer, CustomerId};
use orderdesk_core::pagination::{Page, PageRequest};

use super::{count_to_u64, parse_timestamp, sql_range, CustomerRepository, RepositoryError};
use crate::DbPool;

const CUSTOMER_COLUMNS: &str =
    "id, first_name, last_name, email, age, gender, state, city, country, created_at";

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_customer(row: &SqliteRow) -> Result<Customer, RepositoryError> {
    let decode = |e: sqlx::Error| RepositoryError::Decode(e.to_string());
    let created_at: String = row.try_get("created_at").map_err(decode)?;

    Ok(Customer {
        id: CustomerId(row.try_get("id").map_err(decode)?),
        first_name: row.try_get("first_name").map_err(decode)?,
        last_name: row.try_get("last_name").map_err(decode)?,
        email: row.try_get("email").map_err(decode)?,
        age: row.try_get("age").map_err(decode)?,
        gender: row.try_get("gender").map_err(decode)?,
        state: row.try_get("state").map_err(decode)?,
        city: row.try_get("city").map_err(decode)?,
        country: row.try_get("country").map_err(decode)?,
        created_at: parse_timestamp("customers.created_at", &created_at)?,
    })
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn list_page(&self, request: &PageRequest) -> Result<Page<Customer>, RepositoryError> {
        let (limit, offset) = sql_range(request);

        let rows = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id ASC LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers").fetch_one(&self.pool).await?;

        let items = rows.iter().map(row_to_customer).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, count_to_u64(total)?))
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_customer).transpose()
    }
}
