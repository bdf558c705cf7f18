use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Bill status lifecycle: issued `Unpaid`, settled `Paid`. `Overdue` exists
/// for bills past due date; nothing flips it automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum BillStatus {
    Unpaid,
    Paid,
    Overdue,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "Unpaid",
            Self::Paid => "Paid",
            Self::Overdue => "Overdue",
        }
    }
}

/// Payment status. Manual front-desk entries are recorded `Success`
/// directly; `Pending`/`Failed` cover gateway-initiated payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

/// A receivable charge issued to a student
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bill {
    pub id: Uuid,
    pub student_id: Uuid,
    pub title: String,
    pub bill_type: String,
    pub academic_year_id: Option<i32>,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub status: BillStatus,
    pub payment_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Bill joined with the owning student, as returned by the list queries
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BillWithStudent {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub bill: Bill,
    pub student_name: String,
    pub student_nisn: String,
}

/// A recorded settlement event against a bill
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub amount: Decimal,
    pub payment_method: String,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for bill creation; `bill_type` already defaulted
#[derive(Debug, Clone)]
pub struct NewBill {
    pub student_id: Uuid,
    pub title: String,
    pub bill_type: String,
    pub academic_year_id: Option<i32>,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

/// Caller-facing bill creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBillInput {
    pub student_id: Uuid,
    pub title: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub bill_type: Option<String>,
    #[serde(default)]
    pub academic_year_id: Option<i32>,
}

/// Partial bill update; unset fields keep their stored values
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillUpdate {
    pub title: Option<String>,
    pub bill_type: Option<String>,
    pub academic_year_id: Option<i32>,
    pub amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
}
