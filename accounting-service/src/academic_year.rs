use crate::error::{AccountingError, AccountingResult};
use crate::models::{AcademicYear, NewAcademicYear};
use database_layer::{DatabasePool, TransactionManager};
use tracing::info;

/// Academic year management.
///
/// Invariant: at most one academic year is active. Activating a year
/// deactivates every other row in the same transaction, so no reader ever
/// observes zero or two active years.
pub struct AcademicYearService {
    db: DatabasePool,
    txm: TransactionManager,
}

impl AcademicYearService {
    pub fn new(db: DatabasePool) -> Self {
        let txm = TransactionManager::new(db.clone());
        Self { db, txm }
    }

    pub async fn create(&self, new: NewAcademicYear) -> AccountingResult<AcademicYear> {
        if new.name.trim().is_empty() {
            return Err(AccountingError::validation("Name is required"));
        }
        if new.end_date < new.start_date {
            return Err(AccountingError::validation("End date must not precede start date"));
        }

        const INSERT: &str = r#"
            INSERT INTO academic_years (name, is_active, start_date, end_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
        "#;

        if !new.is_active {
            let year = sqlx::query_as::<_, AcademicYear>(INSERT)
                .bind(&new.name)
                .bind(new.is_active)
                .bind(new.start_date)
                .bind(new.end_date)
                .fetch_one(self.db.pool())
                .await?;
            return Ok(year);
        }

        let mut tx = self.txm.begin().await?;

        sqlx::query("UPDATE academic_years SET is_active = false, updated_at = now() WHERE is_active = true")
            .execute(&mut *tx)
            .await?;

        let year = sqlx::query_as::<_, AcademicYear>(INSERT)
            .bind(&new.name)
            .bind(new.is_active)
            .bind(new.start_date)
            .bind(new.end_date)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(name = %year.name, "academic year activated");
        Ok(year)
    }

    /// All academic years, most recent first
    pub async fn all(&self) -> AccountingResult<Vec<AcademicYear>> {
        let years = sqlx::query_as::<_, AcademicYear>(
            "SELECT * FROM academic_years ORDER BY start_date DESC",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(years)
    }
}
