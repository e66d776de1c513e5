use std::sync::Arc;

use axum::http::{header::CONTENT_TYPE, HeaderValue, Method, Request};
use axum::Router;
use orderdesk_core::config::{AppConfig, ConfigError, LoadOptions, ServerConfig};
use orderdesk_db::{connect_with_settings, DbPool, SqlCustomerRepository, SqlOrderRepository};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::{api, health, lookup::LookupService};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub service: LookupService,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("invalid CORS origin `{0}`")]
    CorsOrigin(String),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Connects the shared store handle and wires the lookup service around it.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        max_connections = config.database.max_connections,
        "database connection established"
    );

    let service = LookupService::new(
        Arc::new(SqlCustomerRepository::new(db_pool.clone())),
        Arc::new(SqlOrderRepository::new(db_pool.clone())),
        config.api.paging_policy(),
    );

    Ok(Application { config, db_pool, service })
}

impl Application {
    pub fn router(&self) -> Result<Router, BootstrapError> {
        let cors = cors_layer(&self.config.server)?;

        let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                correlation_id = %Uuid::new_v4(),
            )
        });

        Ok(api::router(self.service.clone())
            .merge(health::router(self.db_pool.clone()))
            .fallback(api::unknown_route)
            .layer(cors)
            .layer(trace))
    }
}

fn cors_layer(server: &ServerConfig) -> Result<CorsLayer, BootstrapError> {
    let layer = CorsLayer::new().allow_methods([Method::GET, Method::OPTIONS]).allow_headers([CONTENT_TYPE]);

    match server.cors_allow_origin.as_deref().map(str::trim) {
        None | Some("*") => Ok(layer.allow_origin(Any)),
        Some(origin) => {
            let value = HeaderValue::from_str(origin)
                .map_err(|_| BootstrapError::CorsOrigin(origin.to_string()))?;
            Ok(layer.allow_origin(AllowOrigin::exact(value)))
        }
    }
}
