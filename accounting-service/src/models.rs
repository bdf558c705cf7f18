use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
pub enum PayrollStatus {
    #[default]
    Pending,
    Paid,
}

/// Monthly payroll entry for a staff user. `total` is always derived from
/// the three salary components, never taken from the caller.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payroll {
    pub id: Uuid,
    pub user_id: Uuid,
    pub month_year: String,
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub deductions: Decimal,
    pub total: Decimal,
    pub status: PayrollStatus,
    pub payment_date: DateTime<Utc>,
    pub processed_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPayroll {
    pub user_id: Uuid,
    /// e.g. "11-2023"
    pub month_year: String,
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub deductions: Decimal,
    #[serde(default)]
    pub status: PayrollStatus,
    pub processed_by_id: Uuid,
}

/// Full payroll rewrite; the stored total is recomputed from these fields
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollUpdate {
    pub user_id: Uuid,
    pub month_year: String,
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub deductions: Decimal,
    pub status: PayrollStatus,
}

/// Direction of a cash flow entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum CashFlowKind {
    Income,
    Expense,
}

/// Free-form institutional ledger row. The "Hutang" category tracks
/// third-party debt and feeds the dashboard's debt metric.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CashLedgerEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub source: String,
    pub item_name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: CashFlowKind,
    pub amount: Decimal,
    pub category: String,
    pub notes: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCashLedgerEntry {
    pub date: NaiveDate,
    pub source: String,
    pub item_name: String,
    #[serde(rename = "type")]
    pub kind: CashFlowKind,
    pub amount: Decimal,
    pub category: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_by: Option<Uuid>,
}

/// Mutable columns of a ledger row; unset fields keep their stored values.
/// The entry date and creator are fixed at creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CashLedgerPatch {
    pub source: Option<String>,
    pub item_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<CashFlowKind>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyInfaqEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub source: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: CashFlowKind,
    pub amount: Decimal,
    pub handled_by_id: Uuid,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDailyInfaqEntry {
    pub date: NaiveDate,
    pub source: String,
    #[serde(rename = "type")]
    pub kind: CashFlowKind,
    pub amount: Decimal,
    pub handled_by_id: Uuid,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyInfaqPatch {
    pub source: Option<String>,
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
}

/// School year, e.g. "2023/2024". At most one row is active at a time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AcademicYear {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAcademicYear {
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Dashboard metrics. Independent point-in-time reads, not a snapshot;
/// every field defaults to zero on an empty store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardAnalytics {
    pub total_students: i64,
    pub total_teachers: i64,
    pub paid_spp_count: i64,
    pub unpaid_spp_count: i64,
    pub total_student_savings: Decimal,
    pub total_school_debt: Decimal,
}
