// handlers/protected/contacts.rs - /contacts routes
//
// All statements filter on the caller's id. Update and delete of an id the
// caller does not own touch zero rows and still report success.

use axum::extract::State;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::app::AppState;
use crate::database::models::contact::{MAX_LIMIT, MAX_PHONE_LEN};
use crate::database::models::{Contact, ContactChanges, ContactQuery, Created, NewContact, Page};
use crate::middleware::response::ok;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validation::{FieldRule, RequestContract, Validated};

impl RequestContract for ContactQuery {
    fn rules() -> Vec<FieldRule> {
        vec![
            FieldRule::query("page").optional().int(Some(1), None),
            FieldRule::query("limit").optional().int(Some(1), Some(MAX_LIMIT)),
            FieldRule::query("search").optional().string(),
        ]
    }
}

impl RequestContract for NewContact {
    fn rules() -> Vec<FieldRule> {
        vec![
            FieldRule::body("name").string().non_empty(),
            FieldRule::body("email").optional().email(),
            FieldRule::body("phone").optional().string().max_length(MAX_PHONE_LEN),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateContact {
    pub id: i64,
    #[serde(flatten)]
    pub changes: ContactChanges,
}

impl RequestContract for UpdateContact {
    fn rules() -> Vec<FieldRule> {
        vec![
            FieldRule::path("id").int(Some(1), None),
            FieldRule::body("name").optional().string().non_empty(),
            FieldRule::body("email").optional().email(),
            FieldRule::body("phone").optional().string().max_length(MAX_PHONE_LEN),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactId {
    pub id: i64,
}

impl RequestContract for ContactId {
    fn rules() -> Vec<FieldRule> {
        vec![FieldRule::path("id").int(Some(1), None)]
    }
}

/// GET /contacts - Owned contacts as a bare array, newest first
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Validated(query): Validated<ContactQuery>,
) -> ApiResult<Vec<Contact>> {
    let contacts = state.db.contacts().list(auth_user.owner(), &query).await?;
    Ok(ApiResponse::success(contacts))
}

/// GET /contacts/list - Same listing wrapped with pagination metadata
///
/// Expected Output:
/// ```json
/// { "items": [...], "total": 7, "page": 2, "limit": 5 }
/// ```
pub async fn list_paged(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Validated(query): Validated<ContactQuery>,
) -> ApiResult<Page<Contact>> {
    let repository = state.db.contacts();
    let owner = auth_user.owner();

    let items = repository.list(owner, &query).await?;
    let total = repository.count(owner, &query).await?;

    Ok(ApiResponse::success(Page {
        items,
        total,
        page: query.page(),
        limit: query.limit(),
    }))
}

/// POST /contacts - Create a contact owned by the caller
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Validated(contact): Validated<NewContact>,
) -> ApiResult<Created> {
    let id = state.db.contacts().insert(auth_user.owner(), &contact).await?;
    Ok(ApiResponse::created(Created { id }))
}

/// PATCH /contacts/:id - Change only the supplied fields
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Validated(body): Validated<UpdateContact>,
) -> ApiResult<Value> {
    let affected = state
        .db
        .contacts()
        .update(auth_user.owner(), body.id, &body.changes)
        .await?;
    debug!("Contact {} update touched {} rows", body.id, affected);
    Ok(ok())
}

/// DELETE /contacts/:id - Idempotent delete, always 204
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Validated(ContactId { id }): Validated<ContactId>,
) -> ApiResult<()> {
    let affected = state.db.contacts().delete(auth_user.owner(), id).await?;
    debug!("Contact {} delete touched {} rows", id, affected);
    Ok(ApiResponse::no_content())
}
