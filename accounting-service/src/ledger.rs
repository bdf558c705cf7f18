use crate::error::{AccountingError, AccountingResult};
use crate::models::*;
use database_layer::DatabasePool;
use rust_decimal::Decimal;
use uuid::Uuid;

/// General institutional income/expense log, independent of student billing
pub struct CashLedgerService {
    db: DatabasePool,
}

impl CashLedgerService {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    pub async fn add_entry(&self, new: NewCashLedgerEntry) -> AccountingResult<CashLedgerEntry> {
        if new.source.trim().is_empty() {
            return Err(AccountingError::validation("Source is required"));
        }
        if new.item_name.trim().is_empty() {
            return Err(AccountingError::validation("Item name is required"));
        }
        if new.category.trim().is_empty() {
            return Err(AccountingError::validation("Category is required"));
        }
        if new.amount <= Decimal::ZERO {
            return Err(AccountingError::validation("Amount must be greater than zero"));
        }

        let entry = sqlx::query_as::<_, CashLedgerEntry>(
            r#"
            INSERT INTO cash_ledger (date, source, item_name, type, amount, category, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new.date)
        .bind(&new.source)
        .bind(&new.item_name)
        .bind(new.kind)
        .bind(new.amount)
        .bind(&new.category)
        .bind(&new.notes)
        .bind(new.created_by)
        .fetch_one(self.db.pool())
        .await?;
        Ok(entry)
    }

    pub async fn entries(&self) -> AccountingResult<Vec<CashLedgerEntry>> {
        let entries =
            sqlx::query_as::<_, CashLedgerEntry>("SELECT * FROM cash_ledger ORDER BY date DESC")
                .fetch_all(self.db.pool())
                .await?;
        Ok(entries)
    }

    /// Patch the mutable columns of an entry; the date and creator are fixed
    pub async fn update_entry(
        &self,
        id: Uuid,
        patch: CashLedgerPatch,
    ) -> AccountingResult<CashLedgerEntry> {
        if let Some(amount) = patch.amount {
            if amount <= Decimal::ZERO {
                return Err(AccountingError::validation("Amount must be greater than zero"));
            }
        }

        let entry = sqlx::query_as::<_, CashLedgerEntry>(
            r#"
            UPDATE cash_ledger
            SET
                source = COALESCE($1, source),
                item_name = COALESCE($2, item_name),
                type = COALESCE($3, type),
                amount = COALESCE($4, amount),
                category = COALESCE($5, category),
                notes = COALESCE($6, notes),
                updated_at = now()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&patch.source)
        .bind(&patch.item_name)
        .bind(patch.kind)
        .bind(patch.amount)
        .bind(&patch.category)
        .bind(&patch.notes)
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        entry.ok_or(AccountingError::NotFound("cash ledger entry"))
    }

    pub async fn delete_entry(&self, id: Uuid) -> AccountingResult<()> {
        let result = sqlx::query("DELETE FROM cash_ledger WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(AccountingError::NotFound("cash ledger entry"));
        }
        Ok(())
    }
}

/// Daily infaq (voluntary alms) log
pub struct DailyInfaqService {
    db: DatabasePool,
}

impl DailyInfaqService {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    pub async fn add_entry(&self, new: NewDailyInfaqEntry) -> AccountingResult<DailyInfaqEntry> {
        if new.source.trim().is_empty() {
            return Err(AccountingError::validation("Source is required"));
        }
        if new.amount <= Decimal::ZERO {
            return Err(AccountingError::validation("Amount must be greater than zero"));
        }

        let entry = sqlx::query_as::<_, DailyInfaqEntry>(
            r#"
            INSERT INTO daily_infaq (date, source, type, amount, handled_by_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.date)
        .bind(&new.source)
        .bind(new.kind)
        .bind(new.amount)
        .bind(new.handled_by_id)
        .bind(&new.notes)
        .fetch_one(self.db.pool())
        .await?;
        Ok(entry)
    }

    pub async fn entries(&self) -> AccountingResult<Vec<DailyInfaqEntry>> {
        let entries =
            sqlx::query_as::<_, DailyInfaqEntry>("SELECT * FROM daily_infaq ORDER BY date DESC")
                .fetch_all(self.db.pool())
                .await?;
        Ok(entries)
    }

    pub async fn update_entry(
        &self,
        id: Uuid,
        patch: DailyInfaqPatch,
    ) -> AccountingResult<DailyInfaqEntry> {
        if let Some(amount) = patch.amount {
            if amount <= Decimal::ZERO {
                return Err(AccountingError::validation("Amount must be greater than zero"));
            }
        }

        let entry = sqlx::query_as::<_, DailyInfaqEntry>(
            r#"
            UPDATE daily_infaq
            SET
                source = COALESCE($1, source),
                amount = COALESCE($2, amount),
                notes = COALESCE($3, notes),
                updated_at = now()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&patch.source)
        .bind(patch.amount)
        .bind(&patch.notes)
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        entry.ok_or(AccountingError::NotFound("daily infaq entry"))
    }

    pub async fn delete_entry(&self, id: Uuid) -> AccountingResult<()> {
        let result = sqlx::query("DELETE FROM daily_infaq WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(AccountingError::NotFound("daily infaq entry"));
        }
        Ok(())
    }
}
