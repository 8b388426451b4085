// app.rs - Application state and router assembly
//
// Routes are grouped per tier and mounted twice: at the root and under /api.
// Layer stack, outermost first: trace → rate limit → CORS → panic catcher →
// body limit → (protected only) require_auth → handler.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router,
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyValue, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, warn};

use crate::auth::{PasswordHasher, TokenService};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::Database;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{rate_limit, require_auth};

/// Shared dependencies handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: TokenService,
    pub passwords: PasswordHasher,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database) -> Self {
        Self {
            db,
            tokens: TokenService::new(&config.security.jwt_secret, config.security.jwt_expiry_secs),
            passwords: PasswordHasher::new(config.security.bcrypt_cost),
            config: Arc::new(config),
        }
    }
}

/// Build the complete HTTP application
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let routes = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()));

    let router = Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(&config.security));

    let router = if config.api.enable_rate_limiting {
        rate_limit::apply(router, &config.api)
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(public::health_get))
        .route("/auth/register", post(public::auth_register))
        .route("/auth/login", post(public::auth_login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/whoami", get(protected::auth_whoami))
        .route(
            "/contacts",
            get(protected::contacts_list).post(protected::contacts_create),
        )
        .route("/contacts/list", get(protected::contacts_list_paged))
        .route(
            "/contacts/:id",
            patch(protected::contacts_update).delete(protected::contacts_delete),
        )
        .route(
            "/deals",
            get(protected::deals_list).post(protected::deals_create),
        )
        .route("/deals/:id/stage", patch(protected::deals_stage))
        // Only matched routes authenticate; unknown paths still fall through to 404
        .route_layer(from_fn_with_state(state, require_auth))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Server Error" })),
    )
        .into_response()
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AnyValue)
        .allow_headers(AnyValue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_handler_hides_details() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn cors_accepts_origin_list() {
        let security = SecurityConfig {
            cors_origins: vec!["http://localhost:5173".to_string(), "bad\norigin".to_string()],
            jwt_secret: "x".to_string(),
            jwt_expiry_secs: 60,
            bcrypt_cost: 4,
        };
        // Builds without panicking even with an unusable entry
        let _ = cors_layer(&security);
    }
}
