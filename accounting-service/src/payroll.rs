use crate::error::{AccountingError, AccountingResult};
use crate::models::{NewPayroll, Payroll, PayrollUpdate};
use database_layer::DatabasePool;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Net pay from the three salary components
fn compute_total(basic_salary: Decimal, allowances: Decimal, deductions: Decimal) -> Decimal {
    basic_salary + allowances - deductions
}

/// Payroll service
pub struct PayrollService {
    db: DatabasePool,
}

impl PayrollService {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    /// Create a payroll entry; the payment date is stamped at creation
    pub async fn create(&self, new: NewPayroll) -> AccountingResult<Payroll> {
        if new.month_year.trim().is_empty() {
            return Err(AccountingError::validation("Month-year is required"));
        }

        let total = compute_total(new.basic_salary, new.allowances, new.deductions);

        let payroll = sqlx::query_as::<_, Payroll>(
            r#"
            INSERT INTO payrolls
                (user_id, month_year, basic_salary, allowances, deductions, total, status, payment_date, processed_by_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, now(), $8)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(&new.month_year)
        .bind(new.basic_salary)
        .bind(new.allowances)
        .bind(new.deductions)
        .bind(total)
        .bind(new.status)
        .bind(new.processed_by_id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(payroll)
    }

    /// Payroll entries, optionally filtered by an exact month-year tag
    pub async fn list(&self, month_year: Option<&str>) -> AccountingResult<Vec<Payroll>> {
        let payrolls = match month_year {
            Some(month_year) => {
                sqlx::query_as::<_, Payroll>(
                    "SELECT * FROM payrolls WHERE month_year = $1 ORDER BY created_at DESC",
                )
                .bind(month_year)
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query_as::<_, Payroll>("SELECT * FROM payrolls ORDER BY created_at DESC")
                    .fetch_all(self.db.pool())
                    .await?
            }
        };
        Ok(payrolls)
    }

    /// Rewrite a payroll entry. The stored total is recomputed from the
    /// submitted components; a caller-supplied total is never trusted.
    pub async fn update(&self, id: Uuid, update: PayrollUpdate) -> AccountingResult<Payroll> {
        if update.month_year.trim().is_empty() {
            return Err(AccountingError::validation("Month-year is required"));
        }

        let total = compute_total(update.basic_salary, update.allowances, update.deductions);

        let payroll = sqlx::query_as::<_, Payroll>(
            r#"
            UPDATE payrolls
            SET
                user_id = $1,
                month_year = $2,
                basic_salary = $3,
                allowances = $4,
                deductions = $5,
                total = $6,
                status = $7,
                updated_at = now()
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(update.user_id)
        .bind(&update.month_year)
        .bind(update.basic_salary)
        .bind(update.allowances)
        .bind(update.deductions)
        .bind(total)
        .bind(update.status)
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        payroll.ok_or(AccountingError::NotFound("payroll"))
    }

    pub async fn delete(&self, id: Uuid) -> AccountingResult<()> {
        let result = sqlx::query("DELETE FROM payrolls WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(AccountingError::NotFound("payroll"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn total_is_basic_plus_allowances_minus_deductions() {
        assert_eq!(
            compute_total(dec!(4000000), dec!(750000), dec!(250000)),
            dec!(4500000)
        );
    }

    #[test]
    fn total_can_go_negative_when_deductions_dominate() {
        // Deliberately not clamped; a correction entry can net below zero.
        assert_eq!(
            compute_total(dec!(1000000), Decimal::ZERO, dec!(1500000)),
            dec!(-500000)
        );
    }
}
