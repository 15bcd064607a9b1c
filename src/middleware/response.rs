use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Successful handler outcome; the error side is `ApiError`.
///
/// Handlers return `ApiResult<T>` and never write to the response directly,
/// so every request ends in exactly one of these or one `ApiError`.
#[derive(Debug)]
pub enum ApiResponse<T: Serialize> {
    /// 200 with a JSON body
    Ok(T),
    /// 201 with a `Location` header and no body
    Created { location: String },
    /// 204 with no body
    NoContent,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse::Ok(data)
    }

    pub fn created(location: impl Into<String>) -> Self {
        ApiResponse::Created {
            location: location.into(),
        }
    }

    pub fn no_content() -> Self {
        ApiResponse::NoContent
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Ok(data) => match serde_json::to_value(&data) {
                Ok(value) => (StatusCode::OK, Json(value)).into_response(),
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "message": "Failed to serialize response data" })),
                    )
                        .into_response()
                }
            },
            ApiResponse::Created { location } => match HeaderValue::from_str(&location) {
                Ok(value) => (StatusCode::CREATED, [(header::LOCATION, value)]).into_response(),
                Err(_) => {
                    tracing::error!("Invalid Location header value: {}", location);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "message": "Failed to build response" })),
                    )
                        .into_response()
                }
            },
            ApiResponse::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_sets_location_without_body() {
        let response = ApiResponse::<()>::created("/courses/4").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/courses/4");
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn no_content_is_204() {
        let response = ApiResponse::<()>::no_content().into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn ok_is_json() {
        let response = ApiResponse::ok(json!({ "a": 1 })).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
