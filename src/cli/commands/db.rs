use clap::Subcommand;
use serde_json::json;

use crate::auth::PasswordHasher;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::{NewContact, NewDeal, NewUser, Owner, Stage};
use crate::database::Database;

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "password";

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Apply the database schema")]
    Migrate,

    #[command(about = "Create the demo user with sample contacts and deals")]
    Seed {
        #[arg(long, help = "Password for the demo user", default_value = DEMO_PASSWORD)]
        password: String,
    },
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let db = Database::connect(&config.database).await?;

    let result = match cmd {
        DbCommands::Migrate => {
            db.migrate().await?;
            output_success(&output_format, "Schema is up to date", None)
        }
        DbCommands::Seed { password } => {
            let hasher = PasswordHasher::new(config.security.bcrypt_cost);
            let user_id = seed(&db, &hasher, &password).await?;
            output_success(
                &output_format,
                &format!("Seeded demo data for {}", DEMO_EMAIL),
                Some(json!({ "user_id": user_id })),
            )
        }
    };

    db.close().await;
    result
}

/// Create or reset the demo user, then add two contacts and two deals
async fn seed(db: &Database, hasher: &PasswordHasher, password: &str) -> anyhow::Result<i64> {
    let password_hash = hasher.hash(password).await?;
    let users = db.users();

    let user_id = match users.find_by_email(DEMO_EMAIL).await? {
        Some(user) => {
            users.update_password_hash(user.id, &password_hash).await?;
            user.id
        }
        None => {
            users
                .insert(&NewUser {
                    email: DEMO_EMAIL.to_string(),
                    password_hash,
                    name: "Demo".to_string(),
                })
                .await?
        }
    };

    let owner = Owner::new(user_id);
    for (name, email, phone) in [
        ("Alice", "alice@example.com", "0801-111-1111"),
        ("Bob", "bob@example.com", "0802-222-2222"),
    ] {
        db.contacts()
            .insert(
                owner,
                &NewContact {
                    name: name.to_string(),
                    email: Some(email.to_string()),
                    phone: Some(phone.to_string()),
                },
            )
            .await?;
    }

    for (title, amount, stage) in [
        ("Website Revamp", 500_000.0, Stage::Qualified),
        ("Mobile App", 1_500_000.0, Stage::New),
    ] {
        db.deals()
            .insert(
                owner,
                &NewDeal {
                    title: title.to_string(),
                    amount: Some(amount),
                    stage: Some(stage),
                },
            )
            .await?;
    }

    Ok(user_id)
}
