use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::Withdrawal => "Withdrawal",
        }
    }
}

/// Per-student savings account. `balance` is derived state: it always
/// equals the sum of the account's transaction log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavingAccount {
    pub id: Uuid,
    pub student_id: Uuid,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account joined with the owning student, as returned by the overview list
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccountWithStudent {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub account: SavingAccount,
    pub student_name: String,
    pub student_nisn: String,
}

/// Append-only log entry; never updated or deleted
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavingTransaction {
    pub id: Uuid,
    pub account_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub handled_by_id: Uuid,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Input for a deposit or withdrawal
#[derive(Debug, Clone, Deserialize)]
pub struct NewSavingTransaction {
    pub student_id: Uuid,
    pub handled_by_id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    #[serde(default)]
    pub notes: String,
}
