use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{Course, CourseFields, CourseWithOwner, NewUser, User};
use crate::database::repository::Store;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    courses: BTreeMap<i64, Course>,
    next_user_id: i64,
    next_course_id: i64,
}

impl Tables {
    fn with_owner(&self, course: &Course) -> Result<CourseWithOwner, DatabaseError> {
        let owner = self.users.get(&course.user_id).ok_or_else(|| {
            DatabaseError::QueryError(format!(
                "course {} references missing user {}",
                course.id, course.user_id
            ))
        })?;
        Ok(CourseWithOwner {
            course: course.clone(),
            owner: owner.clone(),
        })
    }
}

/// Process-local store with the same observable semantics as `PgStore`:
/// serial ids starting at 1, unique email addresses, owner foreign key.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email_address == email)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email_address == user.email_address) {
            return Err(DatabaseError::Conflict(format!(
                "The email address \"{}\" is already in use",
                user.email_address
            )));
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let stored = User {
            id: tables.next_user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email_address: user.email_address,
            password: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_courses(&self) -> Result<Vec<CourseWithOwner>, DatabaseError> {
        let tables = self.tables.read().await;
        tables.courses.values().map(|c| tables.with_owner(c)).collect()
    }

    async fn find_course(&self, id: i64) -> Result<Option<CourseWithOwner>, DatabaseError> {
        let tables = self.tables.read().await;
        tables.courses.get(&id).map(|c| tables.with_owner(c)).transpose()
    }

    async fn courses_for_user(&self, user_id: i64) -> Result<Vec<Course>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .courses
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_course(&self, user_id: i64, fields: CourseFields) -> Result<Course, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(DatabaseError::NotFound(format!("user {} not found", user_id)));
        }

        tables.next_course_id += 1;
        let now = Utc::now();
        let course = Course {
            id: tables.next_course_id,
            title: fields.title,
            description: fields.description,
            user_id,
            created_at: now,
            updated_at: now,
        };
        tables.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn update_course(&self, id: i64, fields: CourseFields) -> Result<Course, DatabaseError> {
        let mut tables = self.tables.write().await;
        let course = tables
            .courses
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("course {} not found", id)))?;
        course.title = fields.title;
        course.description = fields.description;
        course.updated_at = Utc::now();
        Ok(course.clone())
    }

    async fn delete_course(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables
            .courses
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("course {} not found", id)))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn close(&self) {
        tracing::info!("Released in-memory store");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Joe".into(),
            last_name: "Smith".into(),
            email_address: email.into(),
            password_hash: "hash".into(),
        }
    }

    fn fields(title: &str) -> CourseFields {
        CourseFields {
            title: title.into(),
            description: "Intro".into(),
        }
    }

    #[tokio::test]
    async fn assigns_serial_ids_and_enforces_unique_email() {
        let store = MemoryStore::new();
        let joe = store.create_user(new_user("joe@smith.com")).await.unwrap();
        let sally = store.create_user(new_user("sally@jones.com")).await.unwrap();
        assert_eq!((joe.id, sally.id), (1, 2));

        let err = store.create_user(new_user("joe@smith.com")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));

        let found = store.find_user_by_email("sally@jones.com").await.unwrap().unwrap();
        assert_eq!(found.id, sally.id);
        assert!(store.find_user_by_email("nobody@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn course_lifecycle() {
        let store = MemoryStore::new();
        let owner = store.create_user(new_user("joe@smith.com")).await.unwrap();

        let course = store.create_course(owner.id, fields("Algorithms")).await.unwrap();
        let loaded = store.find_course(course.id).await.unwrap().unwrap();
        assert_eq!(loaded.owner.id, owner.id);
        assert_eq!(loaded.course.title, "Algorithms");

        let updated = store.update_course(course.id, fields("Data Structures")).await.unwrap();
        assert_eq!(updated.title, "Data Structures");
        assert_eq!(store.courses_for_user(owner.id).await.unwrap().len(), 1);

        store.delete_course(course.id).await.unwrap();
        assert!(store.find_course(course.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_course(course.id).await,
            Err(DatabaseError::NotFound(_))
        ));
        assert!(matches!(
            store.update_course(course.id, fields("x")).await,
            Err(DatabaseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn course_requires_existing_owner() {
        let store = MemoryStore::new();
        let err = store.create_course(42, fields("Orphan")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn lists_courses_in_id_order() {
        let store = MemoryStore::new();
        let owner = store.create_user(new_user("joe@smith.com")).await.unwrap();
        for title in ["B", "A", "C"] {
            store.create_course(owner.id, fields(title)).await.unwrap();
        }
        let ids: Vec<i64> = store
            .list_courses()
            .await
            .unwrap()
            .iter()
            .map(|c| c.course.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
