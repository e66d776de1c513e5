use std::collections::BTreeMap;

use tokio::sync::RwLock;

use orderdesk_core::domain::customer::{Customer, CustomerId};
use orderdesk_core::domain::order::{Order, OrderId};
use orderdesk_core::pagination::{Page, PageRequest};

use super::{CustomerRepository, OrderRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<BTreeMap<CustomerId, Customer>>,
}

impl InMemoryCustomerRepository {
    pub async fn insert(&self, customer: Customer) {
        let mut customers = self.customers.write().await;
        customers.insert(customer.id, customer);
    }
}

#[async_trait::async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn list_page(&self, request: &PageRequest) -> Result<Page<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        let items = slice(customers.values(), request).cloned().collect();
        Ok(Page::new(items, customers.len() as u64))
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<BTreeMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    pub async fn insert(&self, order: Order) {
        let mut orders = self.orders.write().await;
        orders.insert(order.order_id, order);
    }
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn list_for_customer(
        &self,
        customer: CustomerId,
        request: &PageRequest,
    ) -> Result<Page<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        let mut matching = orders.values().filter(|o| o.user_id == customer).collect::<Vec<_>>();
        matching.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| b.order_id.cmp(&a.order_id))
        });

        let total = matching.len() as u64;
        let items = slice(matching.into_iter(), request).cloned().collect();
        Ok(Page::new(items, total))
    }

    async fn count_for_customer(&self, customer: CustomerId) -> Result<u64, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.values().filter(|o| o.user_id == customer).count() as u64)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }
}

fn slice<'a, T: 'a>(
    rows: impl Iterator<Item = &'a T>,
    request: &PageRequest,
) -> impl Iterator<Item = &'a T> {
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    rows.skip(offset).take(request.limit() as usize)
}
