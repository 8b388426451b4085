// validation/mod.rs - Declarative request validation
//
// A request type lists its field rules through `RequestContract`; the
// `Validated<T>` extractor evaluates every rule before the handler runs and
// rejects with all failing fields at once.

pub mod rules;

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

pub use rules::{FieldRule, Location};

/// Per-route input contract
pub trait RequestContract: DeserializeOwned {
    fn rules() -> Vec<FieldRule>;
}

/// Raw request input grouped by location
#[derive(Debug, Default)]
pub struct RequestInput {
    pub path: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub body: Map<String, Value>,
}

impl RequestInput {
    fn get(&self, location: Location, field: &str) -> Option<Value> {
        match location {
            Location::Path => self.path.get(field).cloned().map(Value::String),
            Location::Query => self.query.get(field).cloned().map(Value::String),
            Location::Body => self.body.get(field).cloned(),
        }
    }
}

/// Evaluate all rules and return only the declared fields, with numeric
/// coercions applied. Every failing field is reported.
pub fn validate(rules: &[FieldRule], input: &RequestInput) -> Result<Map<String, Value>, ApiError> {
    let mut matched = Map::new();
    let mut failures = Vec::new();

    for rule in rules {
        let raw = input.get(rule.location(), rule.field());
        match rule.evaluate(raw.as_ref()) {
            Ok(Some(value)) => {
                matched.insert(rule.field().to_string(), value);
            }
            Ok(None) => {}
            Err(failure) => failures.push(failure),
        }
    }

    if failures.is_empty() {
        Ok(matched)
    } else {
        Err(ApiError::validation_error(failures))
    }
}

/// Extractor that runs `T::rules()` and deserializes the matched fields.
/// Must be the last extractor of a handler since it consumes the body.
#[derive(Debug)]
pub struct Validated<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: RequestContract + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let rules = T::rules();
        let (mut parts, body) = req.into_parts();

        let mut input = RequestInput::default();

        if rules.iter().any(|r| r.location() == Location::Path) {
            let Path(params) = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            input.path = params;
        }

        if rules.iter().any(|r| r.location() == Location::Query) {
            let Query(params) = Query::<HashMap<String, String>>::from_request_parts(&mut parts, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            input.query = params;
        }

        if rules.iter().any(|r| r.location() == Location::Body) {
            let bytes = Bytes::from_request(Request::from_parts(parts, body), state)
                .await
                .map_err(|e| {
                    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                        ApiError::PayloadTooLarge(e.body_text())
                    } else {
                        ApiError::bad_request(e.body_text())
                    }
                })?;
            input.body = parse_body(&bytes)?;
        }

        let matched = validate(&rules, &input)?;

        serde_json::from_value(Value::Object(matched))
            .map(Validated)
            .map_err(|e| ApiError::bad_request(format!("Invalid request: {}", e)))
    }
}

/// An empty body is treated as `{}`
fn parse_body(bytes: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::invalid_json("Request body must be a JSON object")),
        Err(e) => Err(ApiError::invalid_json(format!("Invalid JSON body: {}", e))),
    }
}
