use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{courses, system, users};
use crate::middleware::basic_auth_middleware;
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        // Public
        .merge(public_routes())
        // Behind Basic auth
        .merge(protected_routes(&state))
        // Course reads, gated only when configured
        .merge(course_read_routes(&state))
        .fallback(system::not_found)
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/users", post(users::create))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(users::current))
        .route("/users/:id", get(users::get))
        .route("/courses", post(courses::create))
        .route("/courses/:id", put(courses::update).delete(courses::delete))
        .route_layer(from_fn_with_state(state.clone(), basic_auth_middleware))
}

fn course_read_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/courses", get(courses::list))
        .route("/courses/:id", get(courses::get));

    if state.config.security.require_auth_for_reads {
        router.route_layer(from_fn_with_state(state.clone(), basic_auth_middleware))
    } else {
        router
    }
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::LOCATION]);

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return base.allow_origin(cors::Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(origins)
}

/// Turn a handler panic into a 500 so the client always gets a response
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Request handler panicked: {}", detail);
    ApiError::internal_server_error("An unexpected error occurred").into_response()
}
