pub mod config;
pub mod migrate;
pub mod seed;

use orderdesk_core::config::{AppConfig, LoadOptions};
use orderdesk_db::{connect_with_settings, DbPool};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

/// Failure carried out of a command body: error class, message, exit code.
pub(crate) type CommandFailure = (&'static str, String, u8);

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    fn from_outcome(command: &str, outcome: Result<String, CommandFailure>) -> Self {
        match outcome {
            Ok(message) => Self::success(command, message),
            Err((error_class, message, exit_code)) => {
                Self::failure(command, error_class, message, exit_code)
            }
        }
    }
}

/// Loads config, builds a current-thread runtime, connects to the store and runs `body`.
/// The pool is closed afterwards regardless of the outcome.
pub(crate) fn with_store<F, Fut>(command: &str, body: F) -> CommandResult
where
    F: FnOnce(DbPool) -> Fut,
    Fut: std::future::Future<Output = Result<String, CommandFailure>>,
{
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let outcome = runtime.block_on(async {
        // A single connection keeps `sqlite::memory:` stores consistent across statements.
        let pool = connect_with_settings(&config.database.url, 1, config.database.timeout_secs)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        let outcome = body(pool.clone()).await;
        pool.close().await;
        outcome
    });

    CommandResult::from_outcome(command, outcome)
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
