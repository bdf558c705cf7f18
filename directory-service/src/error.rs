use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;
