use axum::extract::State;

use crate::app::AppState;
use crate::database::models::Profile;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /auth/whoami - Profile of the authenticated caller
///
/// A valid token whose user has since disappeared is treated like a bad token.
pub async fn whoami(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<Profile> {
    let user = state
        .db
        .users()
        .find_by_id(auth_user.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(ApiResponse::success(user.profile(auth_user.role)))
}
