use crate::error::{SavingsError, SavingsResult};
use crate::models::*;
use database_layer::{DatabasePool, TransactionManager};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

/// Savings transaction processor
///
/// All balance mutations go through [`Self::process_transaction`], which
/// runs as one database transaction holding a row lock on the account, so
/// two concurrent withdrawals for the same student cannot both pass the
/// balance check. Accounts of different students lock independently.
pub struct SavingsProcessor {
    db: DatabasePool,
    txm: TransactionManager,
}

/// Compute the balance after a transaction; withdrawals beyond the current
/// balance are rejected before any state changes.
fn apply(kind: TransactionKind, balance: Decimal, amount: Decimal) -> SavingsResult<Decimal> {
    match kind {
        TransactionKind::Deposit => Ok(balance + amount),
        TransactionKind::Withdrawal => {
            if balance < amount {
                Err(SavingsError::InsufficientBalance {
                    balance,
                    requested: amount,
                })
            } else {
                Ok(balance - amount)
            }
        }
    }
}

impl SavingsProcessor {
    pub fn new(db: DatabasePool) -> Self {
        let txm = TransactionManager::new(db.clone());
        Self { db, txm }
    }

    /// Apply a deposit or withdrawal to a student's account.
    ///
    /// Creates the account with balance 0 on first use. The whole operation
    /// is atomic: on an overdraft nothing is written, and on success both
    /// the updated balance and the log entry commit together.
    pub async fn process_transaction(
        &self,
        input: NewSavingTransaction,
    ) -> SavingsResult<SavingTransaction> {
        if input.amount <= Decimal::ZERO {
            return Err(SavingsError::Validation(
                "Amount must be greater than zero".to_string(),
            ));
        }

        let mut tx = self.txm.begin().await?;

        let account = sqlx::query_as::<_, SavingAccount>(
            "SELECT * FROM saving_accounts WHERE student_id = $1 FOR UPDATE",
        )
        .bind(input.student_id)
        .fetch_optional(&mut *tx)
        .await?;

        // A freshly inserted row is invisible to concurrent transactions
        // until commit, so it is as good as locked.
        let account = match account {
            Some(account) => account,
            None => {
                sqlx::query_as::<_, SavingAccount>(
                    "INSERT INTO saving_accounts (student_id, balance) VALUES ($1, 0) RETURNING *",
                )
                .bind(input.student_id)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let new_balance = apply(input.kind, account.balance, input.amount)?;

        sqlx::query("UPDATE saving_accounts SET balance = $1, updated_at = now() WHERE id = $2")
            .bind(new_balance)
            .bind(account.id)
            .execute(&mut *tx)
            .await?;

        let txn = sqlx::query_as::<_, SavingTransaction>(
            r#"
            INSERT INTO saving_transactions (account_id, type, amount, handled_by_id, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(account.id)
        .bind(input.kind)
        .bind(input.amount)
        .bind(input.handled_by_id)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            account_id = %account.id,
            kind = input.kind.as_str(),
            %new_balance,
            "saving transaction processed"
        );

        Ok(txn)
    }

    /// A student's account
    pub async fn student_account(&self, student_id: Uuid) -> SavingsResult<SavingAccount> {
        let account =
            sqlx::query_as::<_, SavingAccount>("SELECT * FROM saving_accounts WHERE student_id = $1")
                .bind(student_id)
                .fetch_optional(self.db.pool())
                .await?;
        account.ok_or(SavingsError::NotFound("saving account"))
    }

    /// Every account with its student, most recently active first
    pub async fn all_accounts(&self) -> SavingsResult<Vec<AccountWithStudent>> {
        let accounts = sqlx::query_as::<_, AccountWithStudent>(
            r#"
            SELECT a.*, u.name AS student_name, s.nisn AS student_nisn
            FROM saving_accounts a
            JOIN students s ON s.id = a.student_id
            JOIN users u ON u.id = s.user_id
            ORDER BY a.updated_at DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(accounts)
    }

    /// An account's transaction log, newest first
    pub async fn account_transactions(
        &self,
        account_id: Uuid,
    ) -> SavingsResult<Vec<SavingTransaction>> {
        let transactions = sqlx::query_as::<_, SavingTransaction>(
            r#"
            SELECT id, account_id, type, amount, date, handled_by_id, notes, created_at
            FROM saving_transactions
            WHERE account_id = $1
            ORDER BY date DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn deposit_increases_balance() {
        let balance = apply(TransactionKind::Deposit, dec!(50000), dec!(25000)).unwrap();
        assert_eq!(balance, dec!(75000));
    }

    #[test]
    fn withdrawal_decreases_balance() {
        let balance = apply(TransactionKind::Withdrawal, dec!(50000), dec!(20000)).unwrap();
        assert_eq!(balance, dec!(30000));
    }

    #[test]
    fn withdrawal_of_entire_balance_is_allowed() {
        let balance = apply(TransactionKind::Withdrawal, dec!(50000), dec!(50000)).unwrap();
        assert_eq!(balance, Decimal::ZERO);
    }

    #[test]
    fn overdraft_is_rejected_with_amounts() {
        let err = apply(TransactionKind::Withdrawal, dec!(50000), dec!(80000)).unwrap_err();
        match err {
            SavingsError::InsufficientBalance { balance, requested } => {
                assert_eq!(balance, dec!(50000));
                assert_eq!(requested, dec!(80000));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    proptest! {
        /// After any sequence of operations the balance equals the sum of
        /// accepted deposits minus accepted withdrawals and never goes
        /// negative; rejected operations leave the balance untouched.
        #[test]
        fn balance_matches_accepted_transaction_log(
            ops in prop::collection::vec((any::<bool>(), 1u32..=1_000_000), 0..64)
        ) {
            let mut balance = Decimal::ZERO;
            let mut deposits = Decimal::ZERO;
            let mut withdrawals = Decimal::ZERO;

            for (is_deposit, raw_amount) in ops {
                let amount = Decimal::from(raw_amount);
                let kind = if is_deposit {
                    TransactionKind::Deposit
                } else {
                    TransactionKind::Withdrawal
                };

                match apply(kind, balance, amount) {
                    Ok(next) => {
                        balance = next;
                        match kind {
                            TransactionKind::Deposit => deposits += amount,
                            TransactionKind::Withdrawal => withdrawals += amount,
                        }
                    }
                    Err(SavingsError::InsufficientBalance { .. }) => {
                        prop_assert!(kind == TransactionKind::Withdrawal);
                        prop_assert!(balance < amount);
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {e}"),
                }

                prop_assert!(balance >= Decimal::ZERO);
                prop_assert_eq!(balance, deposits - withdrawals);
            }
        }
    }
}
