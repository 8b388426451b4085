mod common;

use anyhow::Result;
use crm_api::auth::Role;
use crm_api::client::ClientError;

#[tokio::test]
async fn register_then_login_yields_working_tokens() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let client = app.client();
    let email = common::unique_email();

    let registered = client.register(&email, common::PASSWORD, Some("Alice")).await?;
    let logged_in = client.login(&email, common::PASSWORD).await?;

    for token in [registered, logged_in] {
        let profile = app.client().with_token(token).whoami().await?;
        assert_eq!(profile.email, email);
        assert_eq!(profile.name, "Alice");
        assert_eq!(profile.role, Role::User);
    }
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_conflicts() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let client = app.client();
    let email = common::unique_email();

    client.register(&email, common::PASSWORD, None).await?;
    let err = client.register(&email, common::PASSWORD, None).await.unwrap_err();
    assert_eq!(err.status(), Some(409));

    // Emails compare case-insensitively
    let err = client
        .register(&email.to_uppercase(), common::PASSWORD, None)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let client = app.client();
    let email = common::unique_email();
    client.register(&email, common::PASSWORD, None).await?;

    let wrong_password = client.login(&email, "wrongpw").await.unwrap_err();
    let unknown_email = client.login(&common::unique_email(), common::PASSWORD).await.unwrap_err();

    assert!(matches!(wrong_password, ClientError::Unauthorized));
    assert!(matches!(unknown_email, ClientError::Unauthorized));
    Ok(())
}

#[tokio::test]
async fn health_reports_database_up() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let health = app.client().health().await?;
    assert!(health.ok);
    assert!(health.db);
    Ok(())
}
