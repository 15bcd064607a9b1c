use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{Course, CourseFields, CourseWithOwner, NewUser, User};
use crate::database::repository::Store;

const USER_COLUMNS: &str =
    "id, first_name, last_name, email_address, password, created_at, updated_at";

const COURSE_COLUMNS: &str = "id, title, description, user_id, created_at, updated_at";

const COURSE_WITH_OWNER_SELECT: &str = r#"
    SELECT
        c.id, c.title, c.description, c.user_id, c.created_at, c.updated_at,
        u.first_name AS owner_first_name,
        u.last_name AS owner_last_name,
        u.email_address AS owner_email_address,
        u.password AS owner_password,
        u.created_at AS owner_created_at,
        u.updated_at AS owner_updated_at
    FROM courses c
    JOIN users u ON u.id = c.user_id
"#;

/// Flat row produced by `COURSE_WITH_OWNER_SELECT`
#[derive(FromRow)]
struct CourseOwnerRow {
    id: i64,
    title: String,
    description: String,
    user_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_first_name: String,
    owner_last_name: String,
    owner_email_address: String,
    owner_password: String,
    owner_created_at: DateTime<Utc>,
    owner_updated_at: DateTime<Utc>,
}

impl From<CourseOwnerRow> for CourseWithOwner {
    fn from(row: CourseOwnerRow) -> Self {
        Self {
            course: Course {
                id: row.id,
                title: row.title,
                description: row.description,
                user_id: row.user_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            owner: User {
                id: row.user_id,
                first_name: row.owner_first_name,
                last_name: row.owner_last_name,
                email_address: row.owner_email_address,
                password: row.owner_password,
                created_at: row.owner_created_at,
                updated_at: row.owner_updated_at,
            },
        }
    }
}

/// PostgreSQL-backed store over a shared connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email_address = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (first_name, last_name, email_address, password)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email_address)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => DatabaseError::Conflict(
                    format!("The email address \"{}\" is already in use", user.email_address),
                ),
                other => DatabaseError::Sqlx(other),
            })
    }

    async fn list_courses(&self) -> Result<Vec<CourseWithOwner>, DatabaseError> {
        let sql = format!("{} ORDER BY c.id", COURSE_WITH_OWNER_SELECT);
        let rows = sqlx::query_as::<_, CourseOwnerRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CourseWithOwner::from).collect())
    }

    async fn find_course(&self, id: i64) -> Result<Option<CourseWithOwner>, DatabaseError> {
        let sql = format!("{} WHERE c.id = $1", COURSE_WITH_OWNER_SELECT);
        let row = sqlx::query_as::<_, CourseOwnerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CourseWithOwner::from))
    }

    async fn courses_for_user(&self, user_id: i64) -> Result<Vec<Course>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM courses WHERE user_id = $1 ORDER BY id",
            COURSE_COLUMNS
        );
        let courses = sqlx::query_as::<_, Course>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(courses)
    }

    async fn create_course(&self, user_id: i64, fields: CourseFields) -> Result<Course, DatabaseError> {
        let sql = format!(
            "INSERT INTO courses (title, description, user_id)
             VALUES ($1, $2, $3)
             RETURNING {}",
            COURSE_COLUMNS
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    DatabaseError::NotFound(format!("user {} not found", user_id))
                }
                other => DatabaseError::Sqlx(other),
            })
    }

    async fn update_course(&self, id: i64, fields: CourseFields) -> Result<Course, DatabaseError> {
        let sql = format!(
            "UPDATE courses SET title = $1, description = $2, updated_at = now()
             WHERE id = $3
             RETURNING {}",
            COURSE_COLUMNS
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("course {} not found", id)))
    }

    async fn delete_course(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("course {} not found", id)));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Closed database pool");
    }
}
