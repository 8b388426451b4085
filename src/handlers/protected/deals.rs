// handlers/protected/deals.rs - /deals routes

use axum::extract::State;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::app::AppState;
use crate::database::models::{Created, Deal, NewDeal, Stage};
use crate::middleware::response::ok;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validation::{FieldRule, RequestContract, Validated};

impl RequestContract for NewDeal {
    fn rules() -> Vec<FieldRule> {
        vec![
            FieldRule::body("title").string().non_empty(),
            FieldRule::body("amount").optional().float(),
            FieldRule::body("stage").optional().one_of(Stage::NAMES),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeStage {
    pub id: i64,
    pub stage: Stage,
}

impl RequestContract for ChangeStage {
    fn rules() -> Vec<FieldRule> {
        vec![
            FieldRule::path("id").int(Some(1), None),
            FieldRule::body("stage").one_of(Stage::NAMES),
        ]
    }
}

/// GET /deals - Every deal the caller owns, newest first
pub async fn list(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<Vec<Deal>> {
    let deals = state.db.deals().list(auth_user.owner()).await?;
    Ok(ApiResponse::success(deals))
}

/// POST /deals - Create a deal; amount defaults to 0 and stage to "new"
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Validated(deal): Validated<NewDeal>,
) -> ApiResult<Created> {
    let id = state.db.deals().insert(auth_user.owner(), &deal).await?;
    Ok(ApiResponse::created(Created { id }))
}

/// PATCH /deals/:id/stage - Move a deal to any stage
pub async fn stage(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Validated(body): Validated<ChangeStage>,
) -> ApiResult<Value> {
    let affected = state
        .db
        .deals()
        .update_stage(auth_user.owner(), body.id, body.stage)
        .await?;
    debug!("Deal {} moved to {} ({} rows)", body.id, body.stage, affected);
    Ok(ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate, RequestInput};
    use serde_json::json;

    fn body(value: Value) -> RequestInput {
        RequestInput {
            body: value.as_object().cloned().unwrap_or_default(),
            ..Default::default()
        }
    }

    #[test]
    fn create_rejects_unknown_stage() {
        let err = validate(&NewDeal::rules(), &body(json!({ "title": "X", "stage": "invalid" }))).unwrap_err();
        assert_eq!(err.to_json()["details"][0]["field"], "stage");
    }

    #[test]
    fn create_coerces_amount() {
        let matched = validate(&NewDeal::rules(), &body(json!({ "title": "X", "amount": "1000" }))).unwrap();
        let deal: NewDeal = serde_json::from_value(Value::Object(matched)).unwrap();
        assert_eq!(deal.amount, Some(1000.0));
        assert_eq!(deal.stage, None);
    }

    #[test]
    fn stage_change_requires_stage() {
        let mut input = body(json!({}));
        input.path.insert("id".to_string(), "1".to_string());
        let err = validate(&ChangeStage::rules(), &input).unwrap_err();
        assert_eq!(err.to_json()["details"][0]["message"], "is required");

        input.body.insert("stage".to_string(), json!("won"));
        let matched = validate(&ChangeStage::rules(), &input).unwrap();
        let change: ChangeStage = serde_json::from_value(Value::Object(matched)).unwrap();
        assert_eq!(change.stage, Stage::Won);
    }
}
