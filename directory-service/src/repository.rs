use crate::{error::*, models::*};
use async_trait::async_trait;
use database_layer::DatabasePool;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[async_trait]
pub trait StudentDirectory: Send + Sync {
    async fn student_by_id(&self, id: Uuid) -> DirectoryResult<Option<StudentRecord>>;
    async fn student_by_user(&self, user_id: Uuid) -> DirectoryResult<Option<StudentRecord>>;
    async fn parent_by_id(&self, id: Uuid) -> DirectoryResult<Option<ParentRecord>>;
    async fn parent_by_user(&self, user_id: Uuid) -> DirectoryResult<Option<ParentRecord>>;
    async fn children_of_parent(&self, parent_id: Uuid) -> DirectoryResult<Vec<StudentRecord>>;
}

pub struct PgStudentDirectory {
    db: DatabasePool,
}

impl PgStudentDirectory {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }
}

const STUDENT_SELECT: &str = r#"
    SELECT s.id, s.user_id, u.name, s.nisn, s.parent_id, s.unit_id, s.status
    FROM students s
    JOIN users u ON u.id = s.user_id
"#;

#[async_trait]
impl StudentDirectory for PgStudentDirectory {
    async fn student_by_id(&self, id: Uuid) -> DirectoryResult<Option<StudentRecord>> {
        let student = sqlx::query_as::<_, StudentRecord>(&format!("{STUDENT_SELECT} WHERE s.id = $1"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(student)
    }

    async fn student_by_user(&self, user_id: Uuid) -> DirectoryResult<Option<StudentRecord>> {
        let student =
            sqlx::query_as::<_, StudentRecord>(&format!("{STUDENT_SELECT} WHERE s.user_id = $1"))
                .bind(user_id)
                .fetch_optional(self.db.pool())
                .await?;
        Ok(student)
    }

    async fn parent_by_id(&self, id: Uuid) -> DirectoryResult<Option<ParentRecord>> {
        let parent = sqlx::query_as::<_, ParentRecord>(
            r#"
            SELECT p.id, p.user_id, u.name, p.phone
            FROM parents p
            JOIN users u ON u.id = p.user_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(parent)
    }

    async fn parent_by_user(&self, user_id: Uuid) -> DirectoryResult<Option<ParentRecord>> {
        let parent = sqlx::query_as::<_, ParentRecord>(
            r#"
            SELECT p.id, p.user_id, u.name, p.phone
            FROM parents p
            JOIN users u ON u.id = p.user_id
            WHERE p.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(parent)
    }

    async fn children_of_parent(&self, parent_id: Uuid) -> DirectoryResult<Vec<StudentRecord>> {
        let children =
            sqlx::query_as::<_, StudentRecord>(&format!("{STUDENT_SELECT} WHERE s.parent_id = $1 ORDER BY u.name"))
                .bind(parent_id)
                .fetch_all(self.db.pool())
                .await?;
        Ok(children)
    }
}

/// In-memory implementation for development/testing
#[derive(Default)]
pub struct InMemoryDirectory {
    students: Mutex<HashMap<Uuid, StudentRecord>>,
    parents: Mutex<HashMap<Uuid, ParentRecord>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_student(&self, student: StudentRecord) {
        if let Ok(mut students) = self.students.lock() {
            students.insert(student.id, student);
        }
    }

    pub fn insert_parent(&self, parent: ParentRecord) {
        if let Ok(mut parents) = self.parents.lock() {
            parents.insert(parent.id, parent);
        }
    }
}

#[async_trait]
impl StudentDirectory for InMemoryDirectory {
    async fn student_by_id(&self, id: Uuid) -> DirectoryResult<Option<StudentRecord>> {
        Ok(self
            .students
            .lock()
            .ok()
            .and_then(|students| students.get(&id).cloned()))
    }

    async fn student_by_user(&self, user_id: Uuid) -> DirectoryResult<Option<StudentRecord>> {
        Ok(self.students.lock().ok().and_then(|students| {
            students.values().find(|s| s.user_id == user_id).cloned()
        }))
    }

    async fn parent_by_id(&self, id: Uuid) -> DirectoryResult<Option<ParentRecord>> {
        Ok(self
            .parents
            .lock()
            .ok()
            .and_then(|parents| parents.get(&id).cloned()))
    }

    async fn parent_by_user(&self, user_id: Uuid) -> DirectoryResult<Option<ParentRecord>> {
        Ok(self.parents.lock().ok().and_then(|parents| {
            parents.values().find(|p| p.user_id == user_id).cloned()
        }))
    }

    async fn children_of_parent(&self, parent_id: Uuid) -> DirectoryResult<Vec<StudentRecord>> {
        Ok(self.students.lock().ok().map_or_else(Vec::new, |students| {
            students
                .values()
                .filter(|s| s.parent_id == Some(parent_id))
                .cloned()
                .collect()
        }))
    }
}
