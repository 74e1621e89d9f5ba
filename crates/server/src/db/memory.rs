//! Process-local customer store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use customer_master_core::{CustomerId, CustomerRecord};

use super::{CustomerStore, RepositoryError};

/// Customer store kept in memory, lost on restart.
///
/// The write lock is held across the uniqueness check and the write, so code
/// uniqueness holds under concurrent saves.
#[derive(Debug, Default)]
pub struct InMemoryCustomerStore {
    records: RwLock<Vec<CustomerRecord>>,
}

impl InMemoryCustomerStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn exists_by_code(&self, code: &str) -> Result<bool, RepositoryError> {
        Ok(self.records.read().await.iter().any(|r| r.code == code))
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<CustomerRecord>, RepositoryError> {
        Ok(self.records.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_codes(
        &self,
        codes: &[String],
    ) -> Result<Vec<CustomerRecord>, RepositoryError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| codes.contains(&r.code))
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<CustomerRecord>, RepositoryError> {
        Ok(self.records.read().await.clone())
    }

    async fn save(&self, record: CustomerRecord) -> Result<CustomerRecord, RepositoryError> {
        let mut records = self.records.write().await;

        if records
            .iter()
            .any(|r| r.code == record.code && r.id != record.id)
        {
            return Err(RepositoryError::Conflict(format!(
                "code {} violates uk_customer_master_code",
                record.code
            )));
        }

        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => existing.clone_from(&record),
            None => records.push(record.clone()),
        }

        Ok(record)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn record(code: &str) -> CustomerRecord {
        CustomerRecord {
            id: CustomerId::new_v4(),
            code: code.to_string(),
            name: format!("{code} Ltd"),
            billing_address: None,
            tax_code: None,
            credit_limit: Decimal::new(0, 2),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let store = InMemoryCustomerStore::new();
        let saved = store.save(record("C001")).await.unwrap();

        assert!(store.exists_by_code("C001").await.unwrap());
        assert!(!store.exists_by_code("C002").await.unwrap());
        assert_eq!(store.find_by_id(saved.id).await.unwrap(), Some(saved));
        assert_eq!(store.find_by_id(CustomerId::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_rejects_duplicate_code() {
        let store = InMemoryCustomerStore::new();
        store.save(record("C001")).await.unwrap();

        let err = store.save(record("C001")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_same_id_replaces() {
        let store = InMemoryCustomerStore::new();
        let mut saved = store.save(record("C001")).await.unwrap();
        saved.name = "Renamed".to_string();
        store.save(saved.clone()).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all, vec![saved]);
    }

    #[tokio::test]
    async fn test_find_by_codes_returns_matches_only() {
        let store = InMemoryCustomerStore::new();
        store.save(record("C001")).await.unwrap();
        store.save(record("C002")).await.unwrap();

        let found = store
            .find_by_codes(&["C002".to_string(), "C404".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, "C002");

        assert!(store.find_by_codes(&[]).await.unwrap().is_empty());
    }
}
