use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use orderdesk_core::domain::customer::{Customer, CustomerId};
use orderdesk_core::domain::order::{Order, OrderId};
use orderdesk_core::pagination::{Page, PageRequest};

pub mod customer;
pub mod memory;
pub mod order;

pub use customer::SqlCustomerRepository;
pub use memory::{InMemoryCustomerRepository, InMemoryOrderRepository};
pub use order::SqlOrderRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read access to customers.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// One page ordered by id ascending, with the exact number of customers.
    async fn list_page(&self, request: &PageRequest) -> Result<Page<Customer>, RepositoryError>;

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;
}

/// Read access to orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// One page of a customer's orders, newest first, with the exact number of orders that
    /// customer has.
    async fn list_for_customer(
        &self,
        customer: CustomerId,
        request: &PageRequest,
    ) -> Result<Page<Order>, RepositoryError>;

    /// Number of orders referencing `customer`. No order rows are fetched.
    async fn count_for_customer(&self, customer: CustomerId) -> Result<u64, RepositoryError>;

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;
}

pub(crate) fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("{column} `{raw}` is not RFC 3339: {e}")))
}

pub(crate) fn sql_range(request: &PageRequest) -> (i64, i64) {
    let limit = i64::from(request.limit());
    let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
    (limit, offset)
}

pub(crate) fn count_to_u64(count: i64) -> Result<u64, RepositoryError> {
    u64::try_from(count).map_err(|_| RepositoryError::Decode(format!("negative row count {count}")))
}
