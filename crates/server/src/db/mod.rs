//! Customer storage.
//!
//! The service talks to storage only through [`CustomerStore`]. Two
//! implementations exist:
//!
//! - [`PgCustomerStore`] - `PostgreSQL`, table `customer_master`
//! - [`InMemoryCustomerStore`] - process-local, for tests and local runs
//!
//! Both enforce code uniqueness at write time and report a losing writer as
//! [`RepositoryError::Conflict`].
//!
//! # Schema
//!
//! The DDL lives in `crates/server/migrations/` and is applied by operators;
//! the service never runs it on startup.

pub mod customers;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use customer_master_core::{CustomerId, CustomerRecord};

pub use customers::PgCustomerStore;
pub use memory::InMemoryCustomerStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row breaks a record invariant.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique customer code).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Storage operations the customer service relies on.
///
/// `find_by_codes` returns matches only, in no particular order, and makes no
/// promise about how many rows a code yields.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Whether a record with this code exists.
    async fn exists_by_code(&self, code: &str) -> Result<bool, RepositoryError>;

    /// Look a record up by its identity.
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<CustomerRecord>, RepositoryError>;

    /// Fetch every record whose code is in `codes`.
    async fn find_by_codes(&self, codes: &[String])
    -> Result<Vec<CustomerRecord>, RepositoryError>;

    /// Fetch every record.
    async fn find_all(&self) -> Result<Vec<CustomerRecord>, RepositoryError>;

    /// Insert, or replace the record with the same id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if another record already holds
    /// the code.
    async fn save(&self, record: CustomerRecord) -> Result<CustomerRecord, RepositoryError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
