//! Integration tests for the customer master service.
//!
//! These run against a live server and are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the server (in-memory store is enough)
//! CUSTOMER_MASTER_STORE=memory cargo run -p customer-master-server
//!
//! # Run integration tests
//! CUSTOMER_MASTER_BASE_URL=http://localhost:8080 \
//!     cargo test -p customer-master-integration-tests -- --ignored
//! ```

use uuid::Uuid;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("CUSTOMER_MASTER_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// A customer code that is unique per call, so runs do not collide with
/// records left by earlier runs.
#[must_use]
pub fn unique_code(prefix: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(12).collect();
    format!("{prefix}-{suffix}")
}
