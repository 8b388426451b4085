#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;

use crm_api::app::{build_router, AppState};
use crm_api::client::CrmClient;
use crm_api::config::AppConfig;
use crm_api::database::Database;

/// Nothing listens on port 1, so every query against this pool fails
pub const UNREACHABLE_DATABASE_URL: &str = "postgres://crm@127.0.0.1:1/crm_test";

pub const PASSWORD: &str = "secret123";

fn test_config(overrides: &[(&str, &str)]) -> Result<AppConfig> {
    let mut vars: HashMap<String, String> = [
        ("APP_ENV", "test"),
        ("JWT_SECRET", "integration-test-secret"),
        ("API_ENABLE_RATE_LIMITING", "false"),
        ("BCRYPT_COST", "4"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    Ok(AppConfig::from_lookup(|key| vars.get(key).cloned())?)
}

/// Router over a pool that never connects; for requests that must be
/// answered before any store access.
pub fn offline_app() -> Result<(Router, AppState)> {
    offline_app_with(&[])
}

pub fn offline_app_with(overrides: &[(&str, &str)]) -> Result<(Router, AppState)> {
    let mut vars = vec![
        ("DATABASE_URL", UNREACHABLE_DATABASE_URL),
        ("DATABASE_ACQUIRE_TIMEOUT_SECS", "1"),
    ];
    vars.extend_from_slice(overrides);
    let config = test_config(&vars)?;
    let db = Database::connect_lazy(&config.database)?;
    let state = AppState::new(config, db);
    Ok((build_router(state.clone()), state))
}

pub struct TestApp {
    pub base_url: String,
    pub db: Database,
}

impl TestApp {
    pub fn client(&self) -> CrmClient {
        CrmClient::new(&self.base_url).expect("valid base url")
    }

    /// Register a fresh user and return a client carrying its token
    pub async fn signed_up_client(&self) -> Result<CrmClient> {
        let client = self.client();
        let token = client.register(&unique_email(), PASSWORD, Some("Tester")).await?;
        Ok(client.with_token(token))
    }
}

/// Serve the full application on an ephemeral port against `DATABASE_URL`.
/// Returns `None` when no database is configured so the caller can skip.
pub async fn spawn_app() -> Result<Option<TestApp>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping end-to-end test");
        return Ok(None);
    };

    let config = test_config(&[("DATABASE_URL", &url), ("DATABASE_MAX_CONNECTIONS", "5")])?;
    let db = Database::connect(&config.database)
        .await
        .context("failed to connect to DATABASE_URL")?;
    db.migrate().await?;

    let app = build_router(AppState::new(config, db.clone()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await;
    });

    Ok(Some(TestApp {
        base_url: format!("http://{}", addr),
        db,
    }))
}

pub fn unique_email() -> String {
    format!("user-{}@example.com", uuid::Uuid::new_v4())
}
