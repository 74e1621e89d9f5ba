//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                 - Liveness
//! GET   /health/ready           - Readiness (store ping)
//!
//! # Customers
//! POST  /customers              - Create
//! GET   /customers/all          - List all
//! GET   /customers/by-codes     - List by codes (?codes=a,b or repeated)
//! GET   /customers/{code}       - Show one
//! PUT   /customers/{code}       - Replace
//! PATCH /customers/{code}       - Merge
//! ```
//!
//! Unknown paths and unsupported methods answer with the API error body.

pub mod customers;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::correlation_id_middleware;
use crate::state::AppState;

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/customers", post(customers::create))
        .route("/customers/all", get(customers::list_all))
        .route("/customers/by-codes", get(customers::list_by_codes))
        .route(
            "/customers/{code}",
            get(customers::show)
                .put(customers::replace)
                .patch(customers::update),
        )
}

/// Build the application router with its middleware stack.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(customer_routes())
        .fallback(no_route)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(from_fn(correlation_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        correlation_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable, with the API error body, if the store
/// does not answer.
async fn readiness(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.customers().store().ping().await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness check failed");
        AppError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            reason: Some("Store unavailable.".to_string()),
        }
    })?;
    Ok(StatusCode::OK)
}

async fn no_route() -> AppError {
    AppError::NoRoute
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
