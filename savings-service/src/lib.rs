//! Per-student savings ledger.
//!
//! Each student has at most one account, created lazily on the first
//! transaction. The balance is mutated only by
//! [`SavingsProcessor::process_transaction`], which serializes concurrent
//! deposits and withdrawals for the same student with a row lock so the
//! balance always equals the sum of the append-only transaction log and
//! never goes negative.

pub mod error;
pub mod models;
pub mod processor;

pub use error::{SavingsError, SavingsResult};
pub use models::*;
pub use processor::SavingsProcessor;
