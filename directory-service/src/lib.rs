//! Read-only directory of students, parents, and their owning users.
//!
//! The financial subsystem never mutates directory data; it resolves
//! notification recipients and parent/child relations through the
//! [`StudentDirectory`] trait. The Postgres implementation joins through
//! the `users` table so callers get display names without a second lookup.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{DirectoryError, DirectoryResult};
pub use models::{ParentRecord, StudentRecord};
pub use repository::{InMemoryDirectory, PgStudentDirectory, StudentDirectory};
