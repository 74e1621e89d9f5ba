//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::CustomerStore;
use crate::services::CustomerService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    customers: CustomerService,
}

impl AppState {
    /// Create a new application state over a customer store.
    #[must_use]
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                customers: CustomerService::new(store),
            }),
        }
    }

    /// Get a reference to the customer service.
    #[must_use]
    pub fn customers(&self) -> &CustomerService {
        &self.inner.customers
    }
}
