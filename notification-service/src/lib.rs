//! In-app notification delivery.
//!
//! Notifications are persisted rows the frontend polls; delivery is
//! fire-and-forget from the caller's point of view. Callers that treat a
//! send as best-effort (bill creation) log and swallow the error instead
//! of propagating it.

pub mod error;
pub mod models;
pub mod service;

pub use error::{NotificationError, NotificationResult};
pub use models::{Notification, NotificationKind};
pub use service::{NotificationConfig, NotificationSender, PgNotificationService};
