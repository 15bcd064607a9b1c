use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{self, Credentials, CredentialsError};
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Client-facing message for every authentication failure
const ACCESS_DENIED: &str = "Access Denied";

/// Authenticated user context attached to the request by [`basic_auth_middleware`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub email_address: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email_address: user.email_address.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Why a request failed authentication. Logged, never sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    MissingCredentials,
    MalformedCredentials(CredentialsError),
    UnknownUser(String),
    BadSecret(String),
}

impl std::fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthRejection::MissingCredentials => write!(f, "Authorization header not found"),
            AuthRejection::MalformedCredentials(e) => write!(f, "malformed credentials: {}", e),
            AuthRejection::UnknownUser(email) => write!(f, "user not found for email {}", email),
            AuthRejection::BadSecret(email) => write!(f, "authentication failure for email {}", email),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(AuthUser),
    Rejected(AuthRejection),
}

/// Resolve the caller from an `Authorization: Basic` header.
///
/// Only store or hashing failures are errors; bad credentials are a
/// `Rejected` outcome.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthOutcome, ApiError> {
    let Some(raw) = headers.get(AUTHORIZATION) else {
        return Ok(AuthOutcome::Rejected(AuthRejection::MissingCredentials));
    };

    let credentials = match raw
        .to_str()
        .map_err(|_| CredentialsError::InvalidUtf8)
        .and_then(Credentials::from_header)
    {
        Ok(credentials) => credentials,
        Err(e) => return Ok(AuthOutcome::Rejected(AuthRejection::MalformedCredentials(e))),
    };

    let Some(user) = state.store.find_user_by_email(&credentials.email).await? else {
        auth::equalize_timing(credentials.secret, state.config.security.bcrypt_cost).await?;
        return Ok(AuthOutcome::Rejected(AuthRejection::UnknownUser(credentials.email)));
    };

    if !auth::verify_password(credentials.secret, user.password.clone()).await? {
        return Ok(AuthOutcome::Rejected(AuthRejection::BadSecret(credentials.email)));
    }

    Ok(AuthOutcome::Authenticated(AuthUser::from(&user)))
}

/// Basic authentication gate: attaches `AuthUser` or short-circuits with 401
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let outcome = authenticate(&state, request.headers()).await?;
    match outcome {
        AuthOutcome::Authenticated(user) => {
            tracing::debug!("Authenticated user {} ({})", user.id, user.email_address);
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        AuthOutcome::Rejected(reason) => {
            tracing::warn!("Authentication rejected: {}", reason);
            Err(ApiError::unauthorized(
                ACCESS_DENIED,
                state.config.security.auth_realm.clone(),
            ))
        }
    }
}

// Handlers behind the gate take `AuthUser` as an argument
#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            tracing::error!("AuthUser requested on a route without the authentication layer");
            ApiError::unauthorized(ACCESS_DENIED, state.config.security.auth_realm.clone())
        })
    }
}
