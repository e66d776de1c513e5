pub mod config;
pub mod domain;
pub mod errors;
pub mod pagination;

pub use domain::customer::{Customer, CustomerId, CustomerSummary};
pub use domain::order::{Order, OrderId};
pub use errors::{ErrorKind, LookupError};
pub use pagination::{Page, PageRequest, Pagination, PagingPolicy};
