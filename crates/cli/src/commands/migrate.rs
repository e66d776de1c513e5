use crate::commands::{with_store, CommandResult};
use orderdesk_db::migrations;

pub fn run() -> CommandResult {
    with_store("migrate", |pool| async move {
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        Ok("applied pending migrations".to_string())
    })
}
