use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("user {0} is not a student")]
    NotAStudent(Uuid),

    #[error("user {0} is not a parent")]
    NotAParent(Uuid),

    #[error("Directory error: {0}")]
    Directory(#[from] directory_service::DirectoryError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type BillingResult<T> = Result<T, BillingError>;
