//! `PostgreSQL` customer store.
//!
//! Queries are runtime-checked (`query_as` + `FromRow`) so the crate builds
//! without a live database.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use customer_master_core::{CustomerId, CustomerRecord};

use super::{CustomerStore, RepositoryError};

/// Row shape of `customer_master`.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    code: String,
    name: String,
    billing_address: Option<String>,
    tax_code: Option<String>,
    credit_limit: Decimal,
    active: bool,
}

impl TryFrom<CustomerRow> for CustomerRecord {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        if row.credit_limit < Decimal::ZERO {
            return Err(RepositoryError::DataCorruption(format!(
                "customer {} has negative credit limit {}",
                row.code, row.credit_limit
            )));
        }

        Ok(Self {
            id: row.id,
            code: row.code,
            name: row.name,
            billing_address: row.billing_address,
            tax_code: row.tax_code,
            credit_limit: row.credit_limit,
            active: row.active,
        })
    }
}

/// Customer store backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn exists_by_code(&self, code: &str) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM customer_master WHERE code = $1)",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<CustomerRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, code, name, billing_address, tax_code, credit_limit, active
            FROM customer_master
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CustomerRecord::try_from).transpose()
    }

    async fn find_by_codes(
        &self,
        codes: &[String],
    ) -> Result<Vec<CustomerRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, code, name, billing_address, tax_code, credit_limit, active
            FROM customer_master
            WHERE code = ANY($1)
            ",
        )
        .bind(codes)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CustomerRecord::try_from).collect()
    }

    async fn find_all(&self) -> Result<Vec<CustomerRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, code, name, billing_address, tax_code, credit_limit, active
            FROM customer_master
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CustomerRecord::try_from).collect()
    }

    async fn save(&self, record: CustomerRecord) -> Result<CustomerRecord, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            INSERT INTO customer_master
                (id, code, name, billing_address, tax_code, credit_limit, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                code = EXCLUDED.code,
                name = EXCLUDED.name,
                billing_address = EXCLUDED.billing_address,
                tax_code = EXCLUDED.tax_code,
                credit_limit = EXCLUDED.credit_limit,
                active = EXCLUDED.active,
                updated_at = now()
            RETURNING id, code, name, billing_address, tax_code, credit_limit, active
            ",
        )
        .bind(record.id)
        .bind(&record.code)
        .bind(&record.name)
        .bind(&record.billing_address)
        .bind(&record.tax_code)
        .bind(record.credit_limit)
        .bind(record.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!(
                    "code {} violates {}",
                    record.code,
                    db_err.constraint().unwrap_or("a unique constraint")
                ));
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
