use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::user::{User, UserView};

#[derive(Debug, Clone, FromRow)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable course fields, used for both insert and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseFields {
    pub title: String,
    pub description: String,
}

/// A course joined with its owner
#[derive(Debug, Clone)]
pub struct CourseWithOwner {
    pub course: Course,
    pub owner: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub user_id: i64,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            user_id: course.user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    #[serde(flatten)]
    pub course: CourseSummary,
    pub user: UserView,
}

impl From<&CourseWithOwner> for CourseView {
    fn from(row: &CourseWithOwner) -> Self {
        Self {
            course: CourseSummary::from(&row.course),
            user: UserView::from(&row.owner),
        }
    }
}
