mod common;

use anyhow::Result;
use crm_api::client::ClientError;
use crm_api::database::models::{NewDeal, Stage};

#[tokio::test]
async fn create_applies_defaults() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let client = app.signed_up_client().await?;

    let id = client
        .create_deal(&NewDeal {
            title: "Project X".to_string(),
            ..Default::default()
        })
        .await?;

    let deals = client.list_deals().await?;
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0].id, id);
    assert_eq!(deals[0].amount, 0.0);
    assert_eq!(deals[0].stage, Stage::New);
    Ok(())
}

#[tokio::test]
async fn stage_transitions_are_unconstrained() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let client = app.signed_up_client().await?;
    let id = client
        .create_deal(&NewDeal {
            title: "Renewal".to_string(),
            amount: Some(1000.0),
            stage: Some(Stage::Won),
        })
        .await?;

    for stage in [Stage::New, Stage::Lost, Stage::Qualified] {
        client.set_deal_stage(id, stage).await?;
        assert_eq!(client.list_deals().await?[0].stage, stage);
    }
    Ok(())
}

#[tokio::test]
async fn deals_are_scoped_to_owner() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let owner = app.signed_up_client().await?;
    let intruder = app.signed_up_client().await?;

    let id = owner
        .create_deal(&NewDeal {
            title: "Secret".to_string(),
            ..Default::default()
        })
        .await?;

    assert!(intruder.list_deals().await?.is_empty());
    intruder.set_deal_stage(id, Stage::Lost).await?;
    assert_eq!(owner.list_deals().await?[0].stage, Stage::New);
    Ok(())
}

#[tokio::test]
async fn missing_token_reads_as_expired_session() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let err = app.client().list_deals().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    Ok(())
}
