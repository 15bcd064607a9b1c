use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
};
use serde::Serialize;

use crate::auth::hash_password;
use crate::database::models::{CourseSummary, NewUser, UserDetail, UserView};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

use super::parse_id;
use super::validation::{parse_object, required_strings, USER_FIELDS};

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: UserDetail,
}

/// Load a user with the courses they own
async fn load_detail(state: &AppState, id: i64) -> Result<Option<UserDetail>, ApiError> {
    let Some(user) = state.store.find_user(id).await? else {
        return Ok(None);
    };
    let courses = state.store.courses_for_user(id).await?;

    Ok(Some(UserDetail {
        user: UserView::from(&user),
        courses: courses.iter().map(CourseSummary::from).collect(),
    }))
}

/// GET /users - the authenticated user, with owned courses
pub async fn current(State(state): State<AppState>, caller: AuthUser) -> ApiResult<UserEnvelope> {
    let user = load_detail(&state, caller.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::ok(UserEnvelope { user }))
}

/// GET /users/:id - any user by id, with owned courses
pub async fn get(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<UserEnvelope> {
    let id = parse_id(&id, "User")?;
    let user = load_detail(&state, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;
    Ok(ApiResponse::ok(UserEnvelope { user }))
}

/// POST /users - register a new user
///
/// Responds 201 with `Location: /` and no body.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<()> {
    let body = parse_object(&body?)?;
    let [first_name, last_name, email_address, password] = required_strings(&body, USER_FIELDS)?;

    let password_hash = hash_password(password, state.config.security.bcrypt_cost).await?;
    let user = state
        .store
        .create_user(NewUser {
            first_name,
            last_name,
            email_address,
            password_hash,
        })
        .await?;

    tracing::info!("Created user {} ({})", user.id, user.email_address);
    Ok(ApiResponse::created("/"))
}
