use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccountingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Layer(#[from] database_layer::DatabaseError),
}

impl AccountingError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type AccountingResult<T> = Result<T, AccountingError>;
