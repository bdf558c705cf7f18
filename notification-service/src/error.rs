use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Notification delivery is disabled")]
    Disabled,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type NotificationResult<T> = Result<T, NotificationError>;
