use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
};
use serde::Serialize;

use crate::database::models::{CourseFields, CourseView, CourseWithOwner};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

use super::parse_id;
use super::validation::{parse_object, required_strings, COURSE_FIELDS};

#[derive(Debug, Serialize)]
pub struct CourseEnvelope {
    pub course: CourseView,
}

fn course_fields(body: Result<Bytes, BytesRejection>) -> Result<CourseFields, ApiError> {
    let body = parse_object(&body?)?;
    let [title, description] = required_strings(&body, COURSE_FIELDS)?;
    Ok(CourseFields { title, description })
}

/// Load a course for mutation: 404 when absent, then 401 unless `caller` owns it
async fn owned_course(state: &AppState, raw_id: &str, caller: &AuthUser) -> Result<CourseWithOwner, ApiError> {
    let id = parse_id(raw_id, "Course")?;
    let course = state
        .store
        .find_course(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Course {} not found", id)))?;

    if course.course.user_id != caller.id {
        tracing::warn!(
            "User {} attempted to modify course {} owned by user {}",
            caller.id,
            id,
            course.course.user_id
        );
        return Err(ApiError::forbidden("You may only modify courses you own"));
    }

    Ok(course)
}

/// GET /courses - every course with its owner embedded
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<CourseView>> {
    let courses = state.store.list_courses().await?;
    Ok(ApiResponse::ok(courses.iter().map(CourseView::from).collect()))
}

/// GET /courses/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<CourseEnvelope> {
    let id = parse_id(&id, "Course")?;
    let course = state
        .store
        .find_course(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Course {} not found", id)))?;
    Ok(ApiResponse::ok(CourseEnvelope {
        course: CourseView::from(&course),
    }))
}

/// POST /courses - create a course owned by the caller
///
/// Any `userId` in the body is ignored; ownership comes from the credentials.
pub async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<()> {
    let fields = course_fields(body)?;
    let course = state.store.create_course(caller.id, fields).await?;

    tracing::info!("User {} created course {}", caller.id, course.id);
    Ok(ApiResponse::created(format!("/courses/{}", course.id)))
}

/// PUT /courses/:id - replace title and description; owner only
pub async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<()> {
    let existing = owned_course(&state, &id, &caller).await?;
    let fields = course_fields(body)?;
    state.store.update_course(existing.course.id, fields).await?;

    tracing::info!("User {} updated course {}", caller.id, existing.course.id);
    Ok(ApiResponse::no_content())
}

/// DELETE /courses/:id - owner only
pub async fn delete(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let existing = owned_course(&state, &id, &caller).await?;
    state.store.delete_course(existing.course.id).await?;

    tracing::info!("User {} deleted course {}", caller.id, existing.course.id);
    Ok(ApiResponse::no_content())
}
