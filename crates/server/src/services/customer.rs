//! Customer service.
//!
//! The only place business rules live: code uniqueness on create, gap
//! detection on bulk lookup, and the immutable-code rule on replace/merge.
//! Field validation has already happened in the handlers by the time a
//! request reaches this layer.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};

use customer_master_core::mapper;
use customer_master_core::normalize::trim_required;
use customer_master_core::{CustomerRecord, CustomerRequest, CustomerResponse};

use crate::db::{CustomerStore, RepositoryError};

/// Errors from customer operations.
#[derive(Debug, Error)]
pub enum CustomerError {
    /// A record with this code already exists.
    #[error("customer code already exists: {0}")]
    DuplicateCode(String),

    /// Some requested codes have no record, listed in request order.
    #[error("customer codes not found: {}", .0.join(", "))]
    CodesNotFound(Vec<String>),

    /// The body tried to change the code of an existing record.
    #[error("customer code cannot be changed from {current} to {requested}")]
    CodeChange { current: String, requested: String },

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Customer service over a [`CustomerStore`].
#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn CustomerStore>,
}

impl CustomerService {
    /// Create a new customer service.
    #[must_use]
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn CustomerStore {
        self.store.as_ref()
    }

    /// Create a customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::DuplicateCode` if the code is taken; `save` is
    /// not attempted in that case.
    #[instrument(skip_all, fields(code = request.code.as_deref().unwrap_or_default()))]
    pub async fn create(
        &self,
        request: &CustomerRequest,
    ) -> Result<CustomerResponse, CustomerError> {
        let record = mapper::build_new(request);

        if self.store.exists_by_code(&record.code).await? {
            warn!("Duplicate customer code");
            return Err(CustomerError::DuplicateCode(record.code));
        }

        let saved = self.store.save(record).await?;
        info!(id = %saved.id, "Customer created");

        Ok(mapper::to_response(&saved))
    }

    /// Every customer, in store order.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Store` if the store fails.
    #[instrument(skip_all)]
    pub async fn list_all(&self) -> Result<Vec<CustomerResponse>, CustomerError> {
        let records = self.store.find_all().await?;
        Ok(mapper::to_response_list(&records))
    }

    /// Customers with the given codes, in store order.
    ///
    /// An empty `codes` slice lists every customer.
    ///
    /// The gap check compares raw counts: a code requested twice but stored
    /// once fails with an empty missing list.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::CodesNotFound` naming every requested code with
    /// no record.
    #[instrument(skip_all, fields(requested = codes.len()))]
    pub async fn list_by_codes(
        &self,
        codes: &[String],
    ) -> Result<Vec<CustomerResponse>, CustomerError> {
        if codes.is_empty() {
            return self.list_all().await;
        }

        let found = self.store.find_by_codes(codes).await?;

        if found.len() != codes.len() {
            let present: HashSet<&str> = found.iter().map(|r| r.code.as_str()).collect();
            let missing: Vec<String> = codes
                .iter()
                .filter(|code| !present.contains(code.as_str()))
                .cloned()
                .collect();

            warn!(missing = missing.len(), "Requested customer codes not found");
            return Err(CustomerError::CodesNotFound(missing));
        }

        Ok(mapper::to_response_list(&found))
    }

    /// A single customer by code.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::CodesNotFound` if no record has this code.
    #[instrument(skip_all, fields(code = %code))]
    pub async fn get_one(&self, code: &str) -> Result<CustomerResponse, CustomerError> {
        self.list_by_codes(&[code.to_owned()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CustomerError::CodesNotFound(vec![code.to_owned()]))
    }

    /// Replace every field of an existing customer (PUT).
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::CodesNotFound` if no record has this code and
    /// `CustomerError::CodeChange` if the body names a different code.
    #[instrument(skip_all, fields(code = %code))]
    pub async fn replace(
        &self,
        code: &str,
        request: &CustomerRequest,
    ) -> Result<CustomerResponse, CustomerError> {
        let mut record = self.resolve(code).await?;
        ensure_same_code(&record, request)?;

        mapper::replace_all(&mut record, request);
        let saved = self.store.save(record).await?;
        info!(id = %saved.id, "Customer replaced");

        Ok(mapper::to_response(&saved))
    }

    /// Overwrite only the fields present in the body (PATCH).
    ///
    /// # Errors
    ///
    /// Same as [`Self::replace`].
    #[instrument(skip_all, fields(code = %code))]
    pub async fn update(
        &self,
        code: &str,
        request: &CustomerRequest,
    ) -> Result<CustomerResponse, CustomerError> {
        let mut record = self.resolve(code).await?;
        ensure_same_code(&record, request)?;

        mapper::merge_partial(&mut record, request);
        let saved = self.store.save(record).await?;
        info!(id = %saved.id, "Customer updated");

        Ok(mapper::to_response(&saved))
    }

    async fn resolve(&self, code: &str) -> Result<CustomerRecord, CustomerError> {
        self.store
            .find_by_codes(&[code.to_owned()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CustomerError::CodesNotFound(vec![code.to_owned()]))
    }
}

fn ensure_same_code(
    record: &CustomerRecord,
    request: &CustomerRequest,
) -> Result<(), CustomerError> {
    match request.code.as_deref().map(trim_required) {
        Some(requested) if requested != record.code => Err(CustomerError::CodeChange {
            current: record.code.clone(),
            requested,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use customer_master_core::CustomerId;
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::InMemoryCustomerStore;

    /// Wraps the in-memory store and counts writes.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryCustomerStore,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl CustomerStore for CountingStore {
        async fn exists_by_code(&self, code: &str) -> Result<bool, RepositoryError> {
            self.inner.exists_by_code(code).await
        }

        async fn find_by_id(
            &self,
            id: CustomerId,
        ) -> Result<Option<CustomerRecord>, RepositoryError> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_codes(
            &self,
            codes: &[String],
        ) -> Result<Vec<CustomerRecord>, RepositoryError> {
            self.inner.find_by_codes(codes).await
        }

        async fn find_all(&self) -> Result<Vec<CustomerRecord>, RepositoryError> {
            self.inner.find_all().await
        }

        async fn save(&self, record: CustomerRecord) -> Result<CustomerRecord, RepositoryError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(record).await
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    fn service() -> (CustomerService, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        (CustomerService::new(store.clone()), store)
    }

    fn request(code: &str, name: &str) -> CustomerRequest {
        CustomerRequest {
            code: Some(code.to_string()),
            name: Some(name.to_string()),
            ..CustomerRequest::default()
        }
    }

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_create_success() {
        let (service, store) = service();
        let req = CustomerRequest {
            billing_address: Some("Tokyo".to_string()),
            tax_code: Some("T123".to_string()),
            credit_limit: Some("100.00".parse().unwrap()),
            ..request("C001", "Acme")
        };

        let res = service.create(&req).await.unwrap();

        assert_eq!(res.code, "C001");
        assert_eq!(res.name, "Acme");
        assert_eq!(res.credit_limit.to_string(), "100.00");
        assert!(res.active);
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);

        let stored = store.inner.find_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(store.find_by_id(stored[0].id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_duplicate_never_saves() {
        let (service, store) = service();
        service.create(&request("C001", "Acme")).await.unwrap();

        let err = service.create(&request("C001", "Other")).await.unwrap_err();

        assert!(matches!(err, CustomerError::DuplicateCode(ref code) if code == "C001"));
        assert_eq!(err.to_string(), "customer code already exists: C001");
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_list_all_in_store_order() {
        let (service, _) = service();
        service.create(&request("C002", "Beta")).await.unwrap();
        service.create(&request("C001", "Acme")).await.unwrap();

        let all = service.list_all().await.unwrap();
        let listed: Vec<_> = all.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(listed, ["C002", "C001"]);
    }

    #[tokio::test]
    async fn test_list_by_codes_success() {
        let (service, _) = service();
        service.create(&request("C001", "Acme")).await.unwrap();
        service.create(&request("C002", "Beta")).await.unwrap();
        service.create(&request("C003", "Gamma")).await.unwrap();

        let found = service.list_by_codes(&codes(&["C003", "C001"])).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_list_by_codes_reports_missing_in_request_order() {
        let (service, _) = service();
        service.create(&request("C001", "Acme")).await.unwrap();

        let err = service
            .list_by_codes(&codes(&["C003", "C001", "C002"]))
            .await
            .unwrap_err();

        match &err {
            CustomerError::CodesNotFound(missing) => assert_eq!(missing, &codes(&["C003", "C002"])),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("C003, C002"));
    }

    #[tokio::test]
    async fn test_list_by_codes_duplicate_request_fails_with_empty_gap() {
        let (service, _) = service();
        service.create(&request("C001", "Acme")).await.unwrap();

        let err = service
            .list_by_codes(&codes(&["C001", "C001"]))
            .await
            .unwrap_err();

        assert!(matches!(err, CustomerError::CodesNotFound(ref missing) if missing.is_empty()));
    }

    #[tokio::test]
    async fn test_list_by_codes_empty_lists_everything() {
        let (service, _) = service();
        service.create(&request("C001", "Acme")).await.unwrap();

        assert_eq!(service.list_by_codes(&[]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_one() {
        let (service, _) = service();
        service.create(&request("C001", "Acme")).await.unwrap();

        assert_eq!(service.get_one("C001").await.unwrap().name, "Acme");

        let err = service.get_one("C404").await.unwrap_err();
        assert!(matches!(err, CustomerError::CodesNotFound(ref missing) if missing == &codes(&["C404"])));
    }

    #[tokio::test]
    async fn test_replace_resets_absent_fields() {
        let (service, store) = service();
        let created = CustomerRequest {
            credit_limit: Some(Decimal::from(500)),
            active: Some(false),
            tax_code: Some("T1".to_string()),
            ..request("C001", "Acme")
        };
        service.create(&created).await.unwrap();
        let id = store.inner.find_all().await.unwrap()[0].id;

        let res = service
            .replace("C001", &request("C001", "Acme Holdings"))
            .await
            .unwrap();

        assert_eq!(res.name, "Acme Holdings");
        assert_eq!(res.credit_limit.to_string(), "0.00");
        assert!(res.active);
        assert_eq!(res.tax_code, None);

        let stored = store.inner.find_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
    }

    #[tokio::test]
    async fn test_update_merges_present_fields() {
        let (service, _) = service();
        let created = CustomerRequest {
            credit_limit: Some(Decimal::from(500)),
            billing_address: Some("Tokyo".to_string()),
            ..request("C001", "Acme")
        };
        service.create(&created).await.unwrap();

        let patch = CustomerRequest {
            active: Some(false),
            billing_address: Some(String::new()),
            ..CustomerRequest::default()
        };
        let res = service.update("C001", &patch).await.unwrap();

        assert_eq!(res.name, "Acme");
        assert_eq!(res.credit_limit.to_string(), "500.00");
        assert_eq!(res.billing_address, None);
        assert!(!res.active);
    }

    #[tokio::test]
    async fn test_code_change_rejected() {
        let (service, store) = service();
        service.create(&request("C001", "Acme")).await.unwrap();

        let err = service
            .update("C001", &CustomerRequest {
                code: Some("C002".to_string()),
                ..CustomerRequest::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CustomerError::CodeChange { .. }));
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_replace_unknown_code() {
        let (service, _) = service();
        let err = service
            .replace("C404", &request("C404", "Nobody"))
            .await
            .unwrap_err();
        assert!(matches!(err, CustomerError::CodesNotFound(_)));
    }
}
