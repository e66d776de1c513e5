//! Schema provisioning for the bundled SQLite store.
//!
//! The lookup service itself never migrates its store; this is used by the operator CLI and
//! by tests to stand up a local database with the expected tables.

use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use super::run_pending;
    use crate::connect_with_settings;

    const MANAGED_SCHEMA_OBJECTS: &[&str] =
        &["customers", "orders", "idx_orders_user_id_created_at"];

    #[tokio::test]
    async fn migrations_create_lookup_tables() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        for name in MANAGED_SCHEMA_OBJECTS {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE name = ?1")
                    .bind(name)
                    .fetch_one(&pool)
                    .await
                    .expect("query sqlite_master");
            assert_eq!(count, 1, "expected schema object `{name}`");
        }

        pool.close().await;
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");

        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run should be a no-op");

        pool.close().await;
    }

    #[tokio::test]
    async fn orders_must_reference_an_existing_customer() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let result = sqlx::query(
            "INSERT INTO orders (order_id, user_id, status, created_at, num_of_item) \
             VALUES (1, 404, 'Complete', '2024-01-01T00:00:00Z', 1)",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err(), "dangling order should violate the foreign key");
        pool.close().await;
    }
}
