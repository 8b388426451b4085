// client/mod.rs - HTTP client for the CRM API
//
// Thin wrapper over reqwest: adds the bearer token, encodes JSON bodies and
// turns every non-2xx response into a `ClientError`. Used by the `crm` CLI and
// by the end-to-end tests.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::database::models::{
    Contact, ContactChanges, ContactQuery, Created, Deal, NewContact, NewDeal, Page, Profile, Stage,
    StageChange,
};
use crate::handlers::public::auth::TokenResponse;
use crate::handlers::public::health::Health;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Session expired")]
    Unauthorized,

    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        details: Vec<Value>,
    },

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// HTTP status of the failed call, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    #[serde(default)]
    details: Vec<Value>,
}

/// Map a non-2xx response to an error
fn api_error(status: StatusCode, body: &[u8]) -> ClientError {
    if status == StatusCode::UNAUTHORIZED {
        return ClientError::Unauthorized;
    }

    let parsed = serde_json::from_slice::<ErrorBody>(body).ok();
    let (message, details) = match parsed {
        Some(ErrorBody { error: Some(error), details }) => (error, details),
        Some(ErrorBody { error: None, details }) => (format!("HTTP {}", status.as_u16()), details),
        None => (format!("HTTP {}", status.as_u16()), Vec::new()),
    };

    ClientError::Api {
        status: status.as_u16(),
        message,
        details,
    }
}

#[derive(Debug, Clone)]
pub struct CrmClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl CrmClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.endpoint(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await?;
        Err(api_error(status, &body))
    }

    /// GET /health; a degraded server still returns its status body
    pub async fn health(&self) -> Result<Health, ClientError> {
        let response = self.request(Method::GET, "/health").send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() || status == StatusCode::SERVICE_UNAVAILABLE {
            return serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()));
        }
        Err(api_error(status, &body))
    }

    pub async fn register(&self, email: &str, password: &str, name: Option<&str>) -> Result<String, ClientError> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
            password: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<&'a str>,
        }

        let response: TokenResponse = self
            .send(self.request(Method::POST, "/auth/register").json(&Body { email, password, name }))
            .await?;
        Ok(response.token)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, ClientError> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
            password: &'a str,
        }

        let response: TokenResponse = self
            .send(self.request(Method::POST, "/auth/login").json(&Body { email, password }))
            .await?;
        Ok(response.token)
    }

    pub async fn whoami(&self) -> Result<Profile, ClientError> {
        self.send(self.request(Method::GET, "/auth/whoami")).await
    }

    pub async fn list_contacts(&self, query: &ContactQuery) -> Result<Vec<Contact>, ClientError> {
        self.send(self.request(Method::GET, "/contacts").query(query)).await
    }

    pub async fn list_contacts_paged(&self, query: &ContactQuery) -> Result<Page<Contact>, ClientError> {
        self.send(self.request(Method::GET, "/contacts/list").query(query)).await
    }

    pub async fn create_contact(&self, contact: &NewContact) -> Result<i64, ClientError> {
        let created: Created = self
            .send(self.request(Method::POST, "/contacts").json(contact))
            .await?;
        Ok(created.id)
    }

    pub async fn update_contact(&self, id: i64, changes: &ContactChanges) -> Result<(), ClientError> {
        self.send_empty(self.request(Method::PATCH, &format!("/contacts/{}", id)).json(changes))
            .await
    }

    pub async fn delete_contact(&self, id: i64) -> Result<(), ClientError> {
        self.send_empty(self.request(Method::DELETE, &format!("/contacts/{}", id)))
            .await
    }

    pub async fn list_deals(&self) -> Result<Vec<Deal>, ClientError> {
        self.send(self.request(Method::GET, "/deals")).await
    }

    pub async fn create_deal(&self, deal: &NewDeal) -> Result<i64, ClientError> {
        let created: Created = self.send(self.request(Method::POST, "/deals").json(deal)).await?;
        Ok(created.id)
    }

    pub async fn set_deal_stage(&self, id: i64, stage: Stage) -> Result<(), ClientError> {
        self.send_empty(
            self.request(Method::PATCH, &format!("/deals/{}/stage", id))
                .json(&StageChange { stage }),
        )
        .await
    }
}
