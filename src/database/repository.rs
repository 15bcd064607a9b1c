use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Course, CourseFields, CourseWithOwner, NewUser, User};

/// Persistence operations needed by the resource handlers.
///
/// Each mutating call maps to a single statement; implementations make no
/// guarantees across calls.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short name for logs and the health endpoint
    fn backend_name(&self) -> &'static str;

    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// Insert a user. A taken email address yields `DatabaseError::Conflict`.
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    /// All courses with their owners, ordered by id
    async fn list_courses(&self) -> Result<Vec<CourseWithOwner>, DatabaseError>;

    async fn find_course(&self, id: i64) -> Result<Option<CourseWithOwner>, DatabaseError>;

    /// Courses owned by a user, ordered by id
    async fn courses_for_user(&self, user_id: i64) -> Result<Vec<Course>, DatabaseError>;

    async fn create_course(&self, user_id: i64, fields: CourseFields) -> Result<Course, DatabaseError>;

    /// Overwrite title and description. Missing id yields `DatabaseError::NotFound`.
    async fn update_course(&self, id: i64, fields: CourseFields) -> Result<Course, DatabaseError>;

    /// Missing id yields `DatabaseError::NotFound`.
    async fn delete_course(&self, id: i64) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    /// Release connections; called once on shutdown
    async fn close(&self);
}
