//! Correlation id middleware.
//!
//! Every request gets an id, either the one supplied by the caller in
//! `x-correlation-id` or a fresh UUID v4. The id is:
//! - Recorded in the current tracing span
//! - Added to the Sentry scope for error correlation
//! - Returned in the response headers
//!
//! This middleware is also where a pending [`ErrorReport`] becomes an
//! [`ApiError`](crate::error::ApiError) body, since it is the one place that
//! knows both the request path and the id.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

use crate::error::ErrorReport;

/// The HTTP header name for correlation ids.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Correlation id of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// Use the supplied header value, or generate one if it is absent, blank
    /// or not valid header text.
    #[must_use]
    pub fn resolve(header: Option<&HeaderValue>) -> Self {
        let id = header
            .and_then(|h| h.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| Uuid::new_v4().to_string(), String::from);
        Self(id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Middleware that resolves the correlation id and renders error bodies.
pub async fn correlation_id_middleware(request: Request, next: Next) -> Response {
    let correlation_id = CorrelationId::resolve(request.headers().get(CORRELATION_ID_HEADER));
    let path = request.uri().path().to_owned();

    Span::current().record("correlation_id", correlation_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("correlation_id", correlation_id.as_str());
    });

    let mut response = next.run(request).await;

    if let Some(report) = response.extensions_mut().remove::<ErrorReport>() {
        let api_error = report.into_api_error(path, correlation_id.0.clone());
        match serde_json::to_vec(&api_error) {
            Ok(bytes) => {
                response.headers_mut().remove(header::CONTENT_LENGTH);
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                *response.body_mut() = Body::from(bytes);
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize error body"),
        }
    }

    if let Ok(value) = HeaderValue::from_str(correlation_id.as_str()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }

    sentry::configure_scope(|scope| scope.remove_tag("correlation_id"));

    response
}
