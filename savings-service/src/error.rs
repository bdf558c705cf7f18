use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SavingsError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Insufficient balance: balance is {balance}, requested {requested}")]
    InsufficientBalance { balance: Decimal, requested: Decimal },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Layer(#[from] database_layer::DatabaseError),
}

pub type SavingsResult<T> = Result<T, SavingsError>;
