//! Database layer for the school administration backend.
//!
//! Provides the Postgres connection pool shared by every service crate,
//! transaction management for the operations that need multi-statement
//! atomicity (savings processing, academic-year activation), and the
//! embedded schema migrations.

pub mod connection;
pub mod error;
pub mod transaction;

pub use connection::DatabasePool;
pub use error::{DatabaseError, DatabaseResult};
pub use transaction::TransactionManager;
