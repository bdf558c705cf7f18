// Transaction management
use crate::connection::DatabasePool;
use crate::error::DatabaseResult;
use sqlx::{Postgres, Transaction};
use tracing::debug;

/// Begins transactions against a shared pool.
///
/// Callers own the returned transaction and must `commit` it; a dropped
/// transaction rolls back.
pub struct TransactionManager {
    pool: DatabasePool,
}

impl TransactionManager {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Begin a new transaction
    pub async fn begin(&self) -> DatabaseResult<Transaction<'static, Postgres>> {
        debug!("Beginning transaction");
        Ok(self.pool.pool().begin().await?)
    }
}
