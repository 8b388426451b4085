use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{Identity, Role};
use crate::database::models::Owner;
use crate::error::ApiError;

/// Authenticated caller, attached to the request by `require_auth`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

impl AuthUser {
    /// Scope for contact/deal queries
    pub fn owner(&self) -> Owner {
        Owner::new(self.id)
    }
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.subject,
            role: identity.role,
        }
    }
}

/// Bearer token middleware for protected routes. Any deviation from
/// `Authorization: Bearer <token>` or a token that fails verification ends
/// the request with 401 before the handler runs.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).ok_or(ApiError::Unauthorized)?;
    let identity = state.tokens.verify(token)?;

    request.extensions_mut().insert(AuthUser::from(identity));

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization` header of exactly `Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(ApiError::Unauthorized)
    }
}
