//! JSON lookup API.
//!
//! Endpoints (all read-only):
//! - `GET /api/customers?page&limit`    : paginated customers, ascending id
//! - `GET /api/customers/{id}`          : one customer plus `order_count`
//! - `GET /api/orders?user_id&page&limit`: a customer's orders, newest first
//! - `GET /api/orders/{order_id}`       : one order
//!
//! Every response uses the same envelope: `{"success": true, "data": ..., "pagination"?: ...}`
//! or `{"success": false, "error": <category>, "message": <detail>}`.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use orderdesk_core::domain::customer::{Customer, CustomerSummary};
use orderdesk_core::domain::order::Order;
use orderdesk_core::errors::{ErrorKind, LookupError};
use orderdesk_core::pagination::Pagination;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::lookup::{Listing, LookupService};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
}

impl<T> ApiResponse<T> {
    fn single(data: T) -> Json<Self> {
        Json(Self { success: true, data, pagination: None })
    }
}

impl<T> ApiResponse<Vec<T>> {
    fn listing(listing: Listing<T>) -> Json<Self> {
        Json(Self { success: true, data: listing.items, pagination: Some(listing.pagination) })
    }
}

/// Failure half of every handler result.
pub struct ApiFailure(LookupError);

impl From<LookupError> for ApiFailure {
    fn from(value: LookupError) -> Self {
        Self(value)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let error = self.0;
        let status = status_for(error.kind());

        match error.kind() {
            ErrorKind::Internal => error!(
                event_name = "api.request.failed",
                category = error.category(),
                error = %error,
                "store interaction failed"
            ),
            ErrorKind::BadRequest | ErrorKind::NotFound => warn!(
                event_name = "api.request.rejected",
                status = status.as_u16(),
                category = error.category(),
                message = %error,
                "request rejected"
            ),
        }

        let body =
            ApiError { success: false, error: error.category(), message: error.message() };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiFailure>;

/// Decoded `key=value` pairs in request order. Decoding is lossy, so extraction never rejects.
type QueryPairs = Vec<(String, String)>;

/// First occurrence of `key`; repeated keys after it are ignored.
fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
}

fn query_pairs(query: Result<Query<QueryPairs>, QueryRejection>) -> QueryPairs {
    query.map(|Query(pairs)| pairs).unwrap_or_default()
}

/// Raw query text. Coercion and defaults are applied by [`LookupService::page_request`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            page: first_value(pairs, "page").map(str::to_string),
            limit: first_value(pairs, "limit").map(str::to_string),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct OrdersQuery {
    pub user_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl OrdersQuery {
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        let ListQuery { page, limit } = ListQuery::from_pairs(pairs);
        Self { user_id: first_value(pairs, "user_id").map(str::to_string), page, limit }
    }
}

/// Path id text. A segment that does not decode falls back to its raw form so the
/// lookup reports it as not found.
fn path_id(path: Result<Path<String>, PathRejection>, uri: &Uri) -> String {
    match path {
        Ok(Path(id)) => id,
        Err(_) => uri.path().rsplit('/').next().unwrap_or_default().to_string(),
    }
}

/// Envelope-shaped 404 for paths outside the API surface.
pub async fn unknown_route(uri: Uri) -> impl IntoResponse {
    let body = ApiError {
        success: false,
        error: "Not found",
        message: format!("No route for {}", uri.path()),
    };
    (StatusCode::NOT_FOUND, Json(body))
}

pub fn router(service: LookupService) -> Router {
    Router::new()
        .route("/api/customers", get(list_customers))
        .route("/api/customers/{id}", get(get_customer))
        .route("/api/orders", get(list_orders))
        .route("/api/orders/{order_id}", get(get_order))
        .with_state(service)
}

pub async fn list_customers(
    State(service): State<LookupService>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> ApiResult<Vec<Customer>> {
    let query = ListQuery::from_pairs(&query_pairs(query));
    let request = service.page_request(query.page.as_deref(), query.limit.as_deref());
    let listing = service.list_customers(request).await?;

    info!(
        event_name = "api.customers.list",
        page = request.page(),
        limit = request.limit(),
        returned = listing.items.len(),
        total_items = listing.pagination.total_items,
        "customers listed"
    );
    Ok(ApiResponse::listing(listing))
}

pub async fn get_customer(
    State(service): State<LookupService>,
    uri: Uri,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<CustomerSummary> {
    let id = path_id(id, &uri);
    let summary = service.customer_summary(&id).await?;

    info!(
        event_name = "api.customers.get",
        customer_id = %summary.customer.id,
        order_count = summary.order_count,
        "customer summary served"
    );
    Ok(ApiResponse::single(summary))
}

pub async fn list_orders(
    State(service): State<LookupService>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> ApiResult<Vec<Order>> {
    let query = OrdersQuery::from_pairs(&query_pairs(query));
    let request = service.page_request(query.page.as_deref(), query.limit.as_deref());
    let listing = service.list_orders(query.user_id.as_deref(), request).await?;

    info!(
        event_name = "api.orders.list",
        user_id = query.user_id.as_deref().unwrap_or_default(),
        page = request.page(),
        limit = request.limit(),
        returned = listing.items.len(),
        total_items = listing.pagination.total_items,
        "orders listed"
    );
    Ok(ApiResponse::listing(listing))
}

pub async fn get_order(
    State(service): State<LookupService>,
    uri: Uri,
    order_id: Result<Path<String>, PathRejection>,
) -> ApiResult<Order> {
    let order_id = path_id(order_id, &uri);
    let order = service.order_detail(&order_id).await?;

    info!(event_name = "api.orders.get", order_id = %order.order_id, "order served");
    Ok(ApiResponse::single(order))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{router, OrdersQuery};
    use crate::lookup::test_support::{failing_service, seeded_service};

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
        let body = serde_json::from_slice(&bytes).expect("json body");
        (status, body)
    }

    fn ids(body: &Value, key: &str) -> Vec<i64> {
        body["data"]
            .as_array()
            .expect("data array")
            .iter()
            .map(|row| row[key].as_i64().expect("numeric id"))
            .collect()
    }

    #[tokio::test]
    async fn customers_page_two_of_fifteen() {
        let app = router(seeded_service().await);

        let (status, body) = get(app, "/api/customers?page=2&limit=10").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(ids(&body, "id"), vec![11, 12, 13, 14, 15]);
        assert_eq!(
            body["pagination"],
            json!({ "currentPage": 2, "totalPages": 2, "totalItems": 15, "itemsPerPage": 10 })
        );
    }

    #[tokio::test]
    async fn customers_default_paging_when_params_missing_or_garbage() {
        let (_, defaults) = get(router(seeded_service().await), "/api/customers").await;
        let (status, garbage) =
            get(router(seeded_service().await), "/api/customers?page=abc&limit=x").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&defaults, "id"), (1..=10).collect::<Vec<_>>());
        assert_eq!(defaults["pagination"]["currentPage"], json!(1));
        assert_eq!(defaults["pagination"]["itemsPerPage"], json!(10));
        assert_eq!(garbage["pagination"], defaults["pagination"]);
    }

    #[tokio::test]
    async fn customer_records_use_snake_case_fields() {
        let (_, body) = get(router(seeded_service().await), "/api/customers?limit=1").await;

        let first = &body["data"][0];
        for field in [
            "id",
            "first_name",
            "last_name",
            "email",
            "age",
            "gender",
            "state",
            "city",
            "country",
            "created_at",
        ] {
            assert!(first.get(field).is_some(), "missing field {field}");
        }
    }

    #[tokio::test]
    async fn customer_detail_includes_order_count() {
        let app = router(seeded_service().await);

        let (status, body) = get(app, "/api/customers/1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["id"], json!(1));
        assert_eq!(body["data"]["email"], json!("customer1@example.com"));
        assert_eq!(body["data"]["order_count"], json!(3));
        assert!(body.get("pagination").is_none());
    }

    #[tokio::test]
    async fn missing_customer_is_404_naming_the_id() {
        let (status, body) = get(router(seeded_service().await), "/api/customers/4242").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": "Customer not found",
                "message": "Customer with ID 4242 not found"
            })
        );
    }

    #[tokio::test]
    async fn orders_without_user_id_is_400() {
        let (status, body) = get(router(seeded_service().await), "/api/orders?page=1").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("Bad request"));
        assert_eq!(body["message"], json!("user_id query parameter is required"));
    }

    #[tokio::test]
    async fn orders_for_customer_without_orders_is_404_not_empty_list() {
        let (status, body) = get(router(seeded_service().await), "/api/orders?user_id=5").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("Orders not found"));
        assert_eq!(body["message"], json!("No orders found for user_id 5"));
    }

    #[tokio::test]
    async fn orders_listing_is_paginated_newest_first() {
        let app = router(seeded_service().await);

        let (status, body) = get(app, "/api/orders?user_id=1&page=2&limit=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body, "order_id"), vec![100]);
        assert_eq!(body["data"][0]["user_id"], json!(1));
        assert_eq!(
            body["pagination"],
            json!({ "currentPage": 2, "totalPages": 2, "totalItems": 3, "itemsPerPage": 2 })
        );
    }

    #[tokio::test]
    async fn order_detail_found_and_missing() {
        let (status, body) = get(router(seeded_service().await), "/api/orders/200").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["order_id"], json!(200));
        assert_eq!(body["data"]["num_of_item"], json!(2));
        assert_eq!(body["data"]["status"], json!("Shipped"));

        let (status, body) = get(router(seeded_service().await), "/api/orders/9").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("Order not found"));
        assert_eq!(body["message"], json!("Order with ID 9 not found"));
    }

    #[tokio::test]
    async fn unknown_paths_get_an_enveloped_404() {
        let app = router(seeded_service().await).fallback(super::unknown_route);

        let (status, body) = get(app, "/api/invoices").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("No route for /api/invoices"));
    }

    #[tokio::test]
    async fn repeated_query_keys_use_the_first_value() {
        let (status, body) =
            get(router(seeded_service().await), "/api/customers?page=2&page=1&limit=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body, "id"), vec![6, 7, 8, 9, 10]);
        assert_eq!(body["pagination"]["currentPage"], json!(2));

        let (status, body) =
            get(router(seeded_service().await), "/api/orders?user_id=2&user_id=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body, "order_id"), vec![200]);
    }

    #[tokio::test]
    async fn undecodable_query_text_is_coerced_not_rejected() {
        let (status, body) =
            get(router(seeded_service().await), "/api/customers?page=%FF&limit=%zz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["currentPage"], json!(1));
        assert_eq!(body["pagination"]["itemsPerPage"], json!(10));

        let (status, body) = get(router(seeded_service().await), "/api/orders?user_id=%FF").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("Orders not found"));
    }

    #[tokio::test]
    async fn undecodable_path_ids_are_enveloped_404s() {
        let (status, body) = get(router(seeded_service().await), "/api/customers/%FF").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": "Customer not found",
                "message": "Customer with ID %FF not found"
            })
        );

        let (status, body) = get(router(seeded_service().await), "/api/orders/%C3%28").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("Order not found"));
        assert_eq!(body["success"], json!(false));
    }

    #[test]
    fn query_pairs_keep_the_first_occurrence() {
        let pairs = vec![
            ("limit".to_string(), "3".to_string()),
            ("user_id".to_string(), "7".to_string()),
            ("limit".to_string(), "50".to_string()),
        ];

        assert_eq!(
            OrdersQuery::from_pairs(&pairs),
            OrdersQuery { user_id: Some("7".to_string()), page: None, limit: Some("3".to_string()) }
        );
    }

    #[tokio::test]
    async fn store_failure_is_500_with_upstream_message() {
        for uri in ["/api/customers", "/api/customers/1", "/api/orders?user_id=1", "/api/orders/1"]
        {
            let (status, body) = get(router(failing_service()), uri).await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "uri {uri}");
            assert_eq!(body["success"], json!(false));
            assert_eq!(body["error"], json!("Internal server error"));
            assert!(
                body["message"].as_str().unwrap_or_default().contains("timed out"),
                "uri {uri}: {body}"
            );
        }
    }
}
