use crate::error::AccountingResult;
use crate::models::{CashFlowKind, DashboardAnalytics};
use database_layer::DatabasePool;
use rust_decimal::Decimal;

/// Cash ledger category that tracks third-party debt
const DEBT_CATEGORY: &str = "Hutang";

/// Dashboard analytics aggregator.
///
/// Each metric is an independent point-in-time read; slight skew between
/// metrics under concurrent writes is acceptable, and every metric is zero
/// on an empty store.
pub struct AnalyticsService {
    db: DatabasePool,
}

impl AnalyticsService {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    pub async fn dashboard(&self) -> AccountingResult<DashboardAnalytics> {
        let pool = self.db.pool();

        let total_students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(pool)
            .await?;

        let total_teachers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teachers")
            .fetch_one(pool)
            .await?;

        let paid_spp_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bills WHERE bill_type = 'SPP' AND status = 'Paid'",
        )
        .fetch_one(pool)
        .await?;

        let unpaid_spp_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bills WHERE bill_type = 'SPP' AND status = 'Unpaid'",
        )
        .fetch_one(pool)
        .await?;

        let total_student_savings: Decimal =
            sqlx::query_scalar("SELECT COALESCE(SUM(balance), 0) FROM saving_accounts")
                .fetch_one(pool)
                .await?;

        let debt_taken = self.debt_sum(CashFlowKind::Income).await?;
        let debt_repaid = self.debt_sum(CashFlowKind::Expense).await?;

        Ok(DashboardAnalytics {
            total_students,
            total_teachers,
            paid_spp_count,
            unpaid_spp_count,
            total_student_savings,
            total_school_debt: debt_taken - debt_repaid,
        })
    }

    async fn debt_sum(&self, kind: CashFlowKind) -> AccountingResult<Decimal> {
        let sum: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM cash_ledger WHERE category = $1 AND type = $2",
        )
        .bind(DEBT_CATEGORY)
        .bind(kind)
        .fetch_one(self.db.pool())
        .await?;
        Ok(sum)
    }
}
