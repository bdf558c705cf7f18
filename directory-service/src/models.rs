use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Student as seen by the financial subsystem: identity, owning user, and
/// the optional parent link used for bill notifications.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub nisn: String,
    pub parent_id: Option<Uuid>,
    pub unit_id: i32,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ParentRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub phone: String,
}
