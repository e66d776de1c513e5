use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Expected order count per seeded customer. Customers missing here have no orders.
const SEED_ORDER_COUNTS: &[(i64, i64)] =
    &[(1, 3), (2, 1), (3, 12), (6, 2), (9, 4), (12, 1), (15, 2)];

const SEED_CUSTOMER_TOTAL: i64 = 15;

/// Deterministic demo data: customers 1..=15 and 25 orders spread across seven of them.
pub struct DemoDataset;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub customers: u64,
    pub orders: u64,
}

#[derive(Clone, Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(String, bool)>,
}

impl DemoDataset {
    pub const SQL: &'static str = include_str!("../../../config/fixtures/demo_seed.sql");

    /// Replaces the contents of both tables with the demo dataset.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        sqlx::raw_sql(Self::SQL).execute(&mut *tx).await?;
        tx.commit().await?;

        let customers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers").fetch_one(pool).await?;
        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders").fetch_one(pool).await?;

        Ok(SeedResult {
            customers: u64::try_from(customers).unwrap_or_default(),
            orders: u64::try_from(orders).unwrap_or_default(),
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let customers: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customers WHERE id BETWEEN 1 AND ?1",
        )
        .bind(SEED_CUSTOMER_TOTAL)
        .fetch_one(pool)
        .await?;
        checks.push(("customers".to_string(), customers == SEED_CUSTOMER_TOTAL));

        for &(customer_id, expected) in SEED_ORDER_COUNTS {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?1")
                .bind(customer_id)
                .fetch_one(pool)
                .await?;
            checks.push((format!("orders-for-customer-{customer_id}"), count == expected));
        }

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { all_present, checks })
    }

    pub fn expected_order_count(customer_id: i64) -> u64 {
        SEED_ORDER_COUNTS
            .iter()
            .find(|(id, _)| *id == customer_id)
            .map(|(_, count)| *count as u64)
            .unwrap_or(0)
    }
}

impl VerificationResult {
    pub fn failed_checks(&self) -> Vec<&str> {
        self.checks.iter().filter_map(|(check, passed)| (!passed).then_some(check.as_str())).collect()
    }
}
