use std::env;
use std::fs;
use std::path::Path;

use orderdesk_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };

    CommandResult { exit_code: 0, output: render(&config) }
}

/// Renders one line per effective key, annotated with where the value came from.
pub fn render(config: &AppConfig) -> String {
    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let cors = config.server.cors_allow_origin.as_deref().unwrap_or("*");
    let entries: [(&str, String, &[&str]); 10] = [
        ("database.url", redact_url(&config.database.url), &["ORDERDESK_DATABASE_URL"]),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["ORDERDESK_DATABASE_MAX_CONNECTIONS"],
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["ORDERDESK_DATABASE_TIMEOUT_SECS"],
        ),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            &["ORDERDESK_SERVER_BIND_ADDRESS"],
        ),
        ("server.port", config.server.port.to_string(), &["ORDERDESK_SERVER_PORT", "PORT"]),
        ("server.cors_allow_origin", cors.to_string(), &["ORDERDESK_SERVER_CORS_ALLOW_ORIGIN"]),
        (
            "api.default_page_size",
            config.api.default_page_size.to_string(),
            &["ORDERDESK_API_DEFAULT_PAGE_SIZE"],
        ),
        (
            "api.max_page_size",
            config.api.max_page_size.to_string(),
            &["ORDERDESK_API_MAX_PAGE_SIZE"],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["ORDERDESK_LOGGING_LEVEL", "ORDERDESK_LOG_LEVEL"],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            &["ORDERDESK_LOGGING_FORMAT", "ORDERDESK_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(
        entries
            .iter()
            .map(|(key, value, env_keys)| render_line(key, value, source(*key, *env_keys))),
    );
    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Masks credentials embedded as `user:password@` in a connection URL.
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.split_once('@') {
        Some((_, host)) => format!("{scheme}://<redacted>@{host}"),
        None => url.to_string(),
    }
}
