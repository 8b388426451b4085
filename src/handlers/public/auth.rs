// handlers/public/auth.rs - POST /auth/register and POST /auth/login

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::AppState;
use crate::auth::Role;
use crate::database::models::user::normalize_email;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{FieldRule, RequestContract, Validated};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl RequestContract for RegisterRequest {
    fn rules() -> Vec<FieldRule> {
        vec![
            FieldRule::body("email").email(),
            FieldRule::body("password").string().length(Some(MIN_PASSWORD_LENGTH), None),
            FieldRule::body("name").optional().string(),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl RequestContract for LoginRequest {
    fn rules() -> Vec<FieldRule> {
        vec![
            FieldRule::body("email").email(),
            FieldRule::body("password").string().length(Some(MIN_PASSWORD_LENGTH), None),
        ]
    }
}

/// `{token}` body returned by register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /auth/register - Create an account and return a token for it
///
/// Expected Input:
/// ```json
/// { "email": "user@example.com", "password": "secret", "name": "Optional" }
/// ```
pub async fn register(
    State(state): State<AppState>,
    Validated(body): Validated<RegisterRequest>,
) -> ApiResult<TokenResponse> {
    let email = normalize_email(&body.email);
    let users = state.db.users();

    if users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = state.passwords.hash(&body.password).await?;

    // A concurrent registration can still win the race; the unique index turns it into 409
    let id = users
        .insert(&NewUser {
            email,
            password_hash,
            name: body.name.unwrap_or_default(),
        })
        .await?;

    info!("Registered user {}", id);

    let token = state.tokens.issue(id, Role::User)?;
    Ok(ApiResponse::success(TokenResponse { token }))
}

/// POST /auth/login - Exchange credentials for a token
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    Validated(body): Validated<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let email = normalize_email(&body.email);

    let Some(user) = state.db.users().find_by_email(&email).await? else {
        state.passwords.verify_dummy(&body.password).await?;
        info!("Login rejected");
        return Err(ApiError::Unauthorized);
    };

    if !state.passwords.verify(&body.password, &user.password_hash).await? {
        info!("Login rejected for user {}", user.id);
        return Err(ApiError::Unauthorized);
    }

    let token = state.tokens.issue(user.id, Role::User)?;
    Ok(ApiResponse::success(TokenResponse { token }))
}
