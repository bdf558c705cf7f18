// Notification service backed by the notifications table.
use crate::error::{NotificationError, NotificationResult};
use crate::models::{Notification, NotificationKind};
use async_trait::async_trait;
use database_layer::DatabasePool;
use tracing::debug;
use uuid::Uuid;

/// Notification service configuration
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub enabled: bool,
}

impl NotificationConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let enabled = std::env::var("NOTIFICATIONS_ENABLED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(true);
        Self { enabled }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver a notification to a single user.
    async fn send(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        kind: NotificationKind,
        reference_id: &str,
    ) -> NotificationResult<()>;
}

pub struct PgNotificationService {
    db: DatabasePool,
    config: NotificationConfig,
}

impl PgNotificationService {
    pub fn new(db: DatabasePool, config: NotificationConfig) -> Self {
        Self { db, config }
    }

    /// Notifications for a user, unread first, newest first
    pub async fn user_notifications(&self, user_id: Uuid) -> NotificationResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, title, message, type, reference_id, is_read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY is_read ASC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(notifications)
    }

    pub async fn mark_as_read(&self, id: Uuid) -> NotificationResult<()> {
        sqlx::query("UPDATE notifications SET is_read = true WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationSender for PgNotificationService {
    async fn send(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        kind: NotificationKind,
        reference_id: &str,
    ) -> NotificationResult<()> {
        if !self.config.enabled {
            return Err(NotificationError::Disabled);
        }

        // Push delivery (FCM) would hang off this insert; the in-app feed
        // reads the row directly.
        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, title, message, type, reference_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(message)
        .bind(kind.as_str())
        .bind(reference_id)
        .execute(self.db.pool())
        .await?;

        debug!(%user_id, kind = kind.as_str(), "notification stored");
        Ok(())
    }
}
