//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction per request; binary only)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Correlation id (resolve id, render error bodies)

pub mod correlation_id;

pub use correlation_id::{CORRELATION_ID_HEADER, CorrelationId, correlation_id_middleware};
