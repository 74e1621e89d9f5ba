//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. `AppError` decides the status,
//! the client-facing message and the violation list; server-side failures are
//! captured to Sentry before responding.
//!
//! The request path and correlation id are not known here, so
//! `into_response` attaches an [`ErrorReport`] to the response extensions and
//! the correlation middleware renders it as an [`ApiError`] body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use customer_master_core::Violation;

use crate::db::RepositoryError;
use crate::services::CustomerError;

/// Application-level error type.
///
/// `into_response` checks variants in declaration order.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failure that already knows its status (business-rule outcomes).
    #[error("{status}: {}", .reason.as_deref().unwrap_or_default())]
    Status {
        status: StatusCode,
        reason: Option<String>,
    },

    /// Request body failed field validation.
    #[error("validation failed: {} violation(s)", .0.len())]
    Validation(Vec<Violation>),

    /// Path or query parameter failed validation.
    #[error("invalid parameter: {} violation(s)", .0.len())]
    InvalidParameter(Vec<Violation>),

    /// Body could not be read or decoded.
    #[error("malformed request body: {detail}")]
    MalformedBody {
        detail: String,
        violation: Option<Violation>,
    },

    /// A required parameter was not supplied.
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    /// Route exists but not for this method.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Storage rejected a write (unique constraint).
    #[error("data integrity violation: {0}")]
    Integrity(String),

    /// No route matches.
    #[error("no route")]
    NoRoute,

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Pending error body, carried in response extensions until the correlation
/// middleware renders it.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub message: String,
    pub violations: Option<Vec<Violation>>,
}

impl ErrorReport {
    /// Complete the report with request context.
    #[must_use]
    pub fn into_api_error(self, path: String, correlation_id: String) -> ApiError {
        ApiError {
            status: self.status.as_u16(),
            error: self
                .status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: self.message,
            path,
            timestamp: Utc::now(),
            correlation_id,
            violations: self.violations,
        }
    }
}

/// Wire-level error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<Violation>>,
}

impl AppError {
    /// Status code this error responds with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Status { status, .. } => *status,
            Self::Validation(_)
            | Self::InvalidParameter(_)
            | Self::MalformedBody { .. }
            | Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Integrity(_) => StatusCode::CONFLICT,
            Self::NoRoute => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_report(self) -> ErrorReport {
        let status = self.status();

        let (message, violations) = match self {
            Self::Status { reason, .. } => (
                reason.unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("Unknown").to_string()
                }),
                None,
            ),
            Self::Validation(violations) | Self::InvalidParameter(violations) => {
                ("Invalid input.".to_string(), Some(violations))
            }
            Self::MalformedBody { violation, .. } => (
                "Malformed request body.".to_string(),
                violation.map(|v| vec![v]),
            ),
            Self::MissingParameter(name) => {
                (format!("Missing required parameter: {name}"), None)
            }
            Self::MethodNotAllowed => ("HTTP method not allowed.".to_string(), None),
            // Details stay in logs
            Self::Integrity(_) => ("Data integrity violation.".to_string(), None),
            Self::NoRoute => ("Endpoint not found.".to_string(), None),
            Self::Internal(_) => ("Internal server error.".to_string(), None),
        };

        ErrorReport {
            status,
            message,
            violations,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::Integrity(_) | Self::Internal(_) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Request error"
                );
            }
            Self::Status { status, .. } if status.is_server_error() => {
                tracing::error!(error = %self, "Request error");
            }
            _ => tracing::debug!(error = %self, "Client error"),
        }

        let report = self.into_report();
        let mut response = report.status.into_response();
        response.extensions_mut().insert(report);
        response
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(detail) => Self::Integrity(detail),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<CustomerError> for AppError {
    fn from(err: CustomerError) -> Self {
        match err {
            CustomerError::Store(store) => store.into(),
            other => {
                let status = match &other {
                    CustomerError::DuplicateCode(_) => StatusCode::CONFLICT,
                    CustomerError::CodesNotFound(_) => StatusCode::NOT_FOUND,
                    CustomerError::CodeChange { .. } => StatusCode::BAD_REQUEST,
                    CustomerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                Self::Status {
                    status,
                    reason: Some(other.to_string()),
                }
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
