mod common;

use anyhow::Result;
use crm_api::database::models::{ContactChanges, ContactQuery, NewContact};

fn contact(name: &str) -> NewContact {
    NewContact {
        name: name.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_and_list_newest_first() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let client = app.signed_up_client().await?;

    let first = client.create_contact(&contact("Alice")).await?;
    let second = client
        .create_contact(&NewContact {
            name: "Bob".to_string(),
            email: Some("bob@example.com".to_string()),
            phone: Some("555-0100".to_string()),
        })
        .await?;

    let contacts = client.list_contacts(&ContactQuery::default()).await?;
    let ids: Vec<i64> = contacts.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(contacts[0].email, "bob@example.com");
    // Omitted optional fields are stored as empty strings
    assert_eq!(contacts[1].email, "");
    assert_eq!(contacts[1].phone, "");
    Ok(())
}

#[tokio::test]
async fn paged_listing_reports_total() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let client = app.signed_up_client().await?;

    for i in 0..7 {
        client.create_contact(&contact(&format!("Contact {}", i))).await?;
    }

    let page = client
        .list_contacts_paged(&ContactQuery {
            page: Some(2),
            limit: Some(5),
            search: None,
        })
        .await?;
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 7);
    assert_eq!((page.page, page.limit), (2, 5));
    Ok(())
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let client = app.signed_up_client().await?;
    client.create_contact(&contact("Only")).await?;

    let query = ContactQuery {
        page: Some(i64::MAX),
        limit: Some(100),
        search: None,
    };
    assert!(client.list_contacts(&query).await?.is_empty());

    let page = client.list_contacts_paged(&query).await?;
    assert!(page.items.is_empty());
    assert_eq!(page.total, 1);
    assert_eq!(page.page, i64::MAX);
    Ok(())
}

#[tokio::test]
async fn search_matches_name_case_insensitively() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let client = app.signed_up_client().await?;
    client.create_contact(&contact("Alice Smith")).await?;
    client.create_contact(&contact("Bob Jones")).await?;
    client.create_contact(&contact("100% Real")).await?;

    let query = |search: &str| ContactQuery {
        search: Some(search.to_string()),
        ..Default::default()
    };

    let found = client.list_contacts(&query("alice")).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Alice Smith");

    // Wildcards in the search term match literally
    let found = client.list_contacts(&query("%")).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "100% Real");
    Ok(())
}

#[tokio::test]
async fn patch_changes_only_supplied_fields() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let client = app.signed_up_client().await?;
    let id = client
        .create_contact(&NewContact {
            name: "Carol".to_string(),
            email: Some("carol@example.com".to_string()),
            phone: None,
        })
        .await?;

    client
        .update_contact(
            id,
            &ContactChanges {
                phone: Some("555-0199".to_string()),
                ..Default::default()
            },
        )
        .await?;

    let contacts = client.list_contacts(&ContactQuery::default()).await?;
    let carol = contacts.iter().find(|c| c.id == id).unwrap();
    assert_eq!(carol.name, "Carol");
    assert_eq!(carol.email, "carol@example.com");
    assert_eq!(carol.phone, "555-0199");
    Ok(())
}

#[tokio::test]
async fn contacts_are_invisible_to_other_users() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let owner = app.signed_up_client().await?;
    let intruder = app.signed_up_client().await?;

    let id = owner.create_contact(&contact("Private")).await?;

    assert!(intruder.list_contacts(&ContactQuery::default()).await?.is_empty());

    // Foreign update and delete report success but change nothing
    intruder
        .update_contact(
            id,
            &ContactChanges {
                name: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .await?;
    intruder.delete_contact(id).await?;

    let contacts = owner.list_contacts(&ContactQuery::default()).await?;
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].name, "Private");
    Ok(())
}

#[tokio::test]
async fn delete_is_idempotent() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let client = app.signed_up_client().await?;
    let id = client.create_contact(&contact("Temp")).await?;

    client.delete_contact(id).await?;
    client.delete_contact(id).await?;
    client.delete_contact(i64::from(i32::MAX)).await?;

    assert!(client.list_contacts(&ContactQuery::default()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn phone_longer_than_limit_is_rejected() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };
    let client = app.signed_up_client().await?;

    let err = client
        .create_contact(&NewContact {
            name: "Dave".to_string(),
            email: None,
            phone: Some("1".repeat(65)),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    Ok(())
}
