//! Store orchestration behind the `/api` endpoints.
//!
//! Each operation issues one or two repository calls and shapes the result. Nothing here is
//! cached and no transaction spans the two calls made for a customer summary: the order count
//! reflects the store at the moment of the second query.

use std::sync::Arc;

use orderdesk_core::domain::customer::{Customer, CustomerId, CustomerSummary};
use orderdesk_core::domain::order::{Order, OrderId};
use orderdesk_core::errors::LookupError;
use orderdesk_core::pagination::{PageRequest, Pagination, PagingPolicy};
use orderdesk_db::{CustomerRepository, OrderRepository};

/// A listing slice together with its pagination block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct LookupService {
    customers: Arc<dyn CustomerRepository>,
    orders: Arc<dyn OrderRepository>,
    policy: PagingPolicy,
}

impl LookupService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        orders: Arc<dyn OrderRepository>,
        policy: PagingPolicy,
    ) -> Self {
        Self { customers, orders, policy }
    }

    pub fn page_request(&self, page: Option<&str>, limit: Option<&str>) -> PageRequest {
        PageRequest::from_raw(page, limit, self.policy)
    }

    pub async fn list_customers(
        &self,
        request: PageRequest,
    ) -> Result<Listing<Customer>, LookupError> {
        let page = self.customers.list_page(&request).await.map_err(LookupError::store)?;

        Ok(Listing { pagination: Pagination::new(&request, page.total), items: page.items })
    }

    pub async fn customer_summary(&self, raw_id: &str) -> Result<CustomerSummary, LookupError> {
        let not_found = || LookupError::CustomerNotFound { id: raw_id.to_string() };
        let id = raw_id.parse::<CustomerId>().map_err(|_| not_found())?;

        let customer = self
            .customers
            .find_by_id(id)
            .await
            .map_err(LookupError::store)?
            .ok_or_else(not_found)?;

        let order_count = self.orders.count_for_customer(id).await.map_err(LookupError::store)?;

        Ok(CustomerSummary { customer, order_count })
    }

    /// Lists a customer's orders. An empty slice is reported as [`LookupError::OrdersNotFound`],
    /// which also covers customers that do not exist.
    pub async fn list_orders(
        &self,
        raw_user_id: Option<&str>,
        request: PageRequest,
    ) -> Result<Listing<Order>, LookupError> {
        let raw_user_id = raw_user_id
            .filter(|value| !value.is_empty())
            .ok_or(LookupError::MissingParameter { name: "user_id" })?;
        let not_found = || LookupError::OrdersNotFound { user_id: raw_user_id.to_string() };
        let user_id = raw_user_id.parse::<CustomerId>().map_err(|_| not_found())?;

        let page =
            self.orders.list_for_customer(user_id, &request).await.map_err(LookupError::store)?;
        if page.is_empty() {
            return Err(not_found());
        }

        Ok(Listing { pagination: Pagination::new(&request, page.total), items: page.items })
    }

    pub async fn order_detail(&self, raw_id: &str) -> Result<Order, LookupError> {
        let not_found = || LookupError::OrderNotFound { id: raw_id.to_string() };
        let id = raw_id.parse::<OrderId>().map_err(|_| not_found())?;

        self.orders.find_by_id(id).await.map_err(LookupError::store)?.ok_or_else(not_found)
    }
}


#[cfg(test)]
mod tests {
    use orderdesk_core::domain::customer::CustomerId;
    use orderdesk_core::errors::{ErrorKind, LookupError};
    use orderdesk_core::pagination::PageRequest;

    use super::test_support::{customer, failing_orders_service, failing_service, seeded_service};

    #[tokio::test]
    async fn second_page_of_fifteen_customers() {
        let service = seeded_service().await;

        let listing = service.list_customers(PageRequest::new(2, 10)).await.expect("listing");

        let ids = listing.items.iter().map(|c| c.id.0).collect::<Vec<_>>();
        assert_eq!(ids, vec![11, 12, 13, 14, 15]);
        assert_eq!(listing.pagination.current_page, 2);
        assert_eq!(listing.pagination.total_pages, 2);
        assert_eq!(listing.pagination.total_items, 15);
        assert_eq!(listing.pagination.items_per_page, 10);
    }

    #[tokio::test]
    async fn slice_never_exceeds_limit_and_pages_round_up() {
        let service = seeded_service().await;

        for limit in 1..=16_u32 {
            for page in 1..=4_u32 {
                let listing =
                    service.list_customers(PageRequest::new(page, limit)).await.expect("listing");
                assert!(listing.items.len() <= limit as usize);
                assert_eq!(listing.pagination.total_pages, 15_u64.div_ceil(u64::from(limit)));
            }
        }
    }

    #[tokio::test]
    async fn summary_counts_zero_one_and_many_orders() {
        let service = seeded_service().await;

        let many = service.customer_summary("1").await.expect("customer 1");
        let one = service.customer_summary("2").await.expect("customer 2");
        let none = service.customer_summary("3").await.expect("customer 3");

        assert_eq!(many.order_count, 3);
        assert_eq!(many.customer, customer(1));
        assert_eq!(one.order_count, 1);
        assert_eq!(none.order_count, 0);
    }

    #[tokio::test]
    async fn unknown_or_malformed_customer_id_is_not_found() {
        let service = seeded_service().await;

        let missing = service.customer_summary("999").await.expect_err("999 is absent");
        let malformed = service.customer_summary("abc").await.expect_err("abc is not an id");

        assert_eq!(missing, LookupError::CustomerNotFound { id: "999".to_string() });
        assert!(missing.message().contains("999"));
        assert_eq!(malformed.kind(), ErrorKind::NotFound);
        assert!(malformed.message().contains("abc"));
    }

    #[tokio::test]
    async fn orders_require_user_id() {
        let service = seeded_service().await;

        let absent = service.list_orders(None, PageRequest::default()).await.expect_err("absent");
        let empty =
            service.list_orders(Some(""), PageRequest::default()).await.expect_err("empty");

        assert_eq!(absent, LookupError::MissingParameter { name: "user_id" });
        assert_eq!(empty.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn orders_are_newest_first_with_pagination() {
        let service = seeded_service().await;

        let listing =
            service.list_orders(Some("1"), PageRequest::new(1, 2)).await.expect("orders");

        let ids = listing.items.iter().map(|o| o.order_id.0).collect::<Vec<_>>();
        assert_eq!(ids, vec![101, 102]);
        assert!(listing.items.iter().all(|o| o.user_id == CustomerId(1)));
        assert_eq!(listing.pagination.total_items, 3);
        assert_eq!(listing.pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn empty_order_slice_is_not_found() {
        let service = seeded_service().await;

        let no_orders =
            service.list_orders(Some("3"), PageRequest::default()).await.expect_err("no orders");
        let past_end =
            service.list_orders(Some("1"), PageRequest::new(9, 10)).await.expect_err("past end");
        let malformed =
            service.list_orders(Some("x1"), PageRequest::default()).await.expect_err("malformed");

        assert_eq!(no_orders, LookupError::OrdersNotFound { user_id: "3".to_string() });
        assert_eq!(past_end.kind(), ErrorKind::NotFound);
        assert_eq!(malformed.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn order_detail_finds_single_order() {
        let service = seeded_service().await;

        let order = service.order_detail("200").await.expect("order 200");
        let missing = service.order_detail("404").await.expect_err("absent");

        assert_eq!(order.user_id, CustomerId(2));
        assert_eq!(missing, LookupError::OrderNotFound { id: "404".to_string() });
    }

    #[tokio::test]
    async fn store_failures_are_internal_errors() {
        let service = failing_service();

        let list = service.list_customers(PageRequest::default()).await.expect_err("list");
        let summary = service.customer_summary("1").await.expect_err("summary");
        let orders = service.list_orders(Some("1"), PageRequest::default()).await.expect_err("orders");
        let order = service.order_detail("1").await.expect_err("order");

        for error in [list, summary, orders, order] {
            assert_eq!(error.kind(), ErrorKind::Internal);
            assert!(error.message().contains("timed out"), "message: {}", error.message());
        }
    }

    #[tokio::test]
    async fn failed_order_count_is_internal_not_not_found() {
        let service = failing_orders_service().await;

        let error = service.customer_summary("1").await.expect_err("count fails");

        assert_eq!(error.kind(), ErrorKind::Internal);
    }
}
