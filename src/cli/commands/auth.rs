use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_session, save_session};
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Register new user and log in")]
    Register {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Display name")]
        name: Option<String>,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Forget the stored token")]
    Logout,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Register { email, name, password } => {
            let password = resolve_password(password, true)?;
            let client = anonymous_client()?;
            let token = client.register(&email, &password, name.as_deref()).await?;

            let mut session = load_session()?;
            session.log_in(&email, token);
            save_session(&session)?;

            output_success(
                &output_format,
                &format!("Registered and logged in as {}", email),
                Some(json!({ "email": email })),
            )
        }
        AuthCommands::Login { email, password } => {
            let password = resolve_password(password, false)?;
            let client = anonymous_client()?;
            let token = client.login(&email, &password).await?;

            let mut session = load_session()?;
            session.log_in(&email, token);
            save_session(&session)?;

            output_success(
                &output_format,
                &format!("Logged in as {}", email),
                Some(json!({ "email": email })),
            )
        }
        AuthCommands::Logout => {
            let mut session = load_session()?;
            session.log_out();
            save_session(&session)?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Whoami => {
            let profile = authenticated_client()?.whoami().await?;
            output_value(&output_format, &profile, |p| {
                println!("ID:    {}", p.id);
                println!("Email: {}", p.email);
                println!("Name:  {}", p.name);
                println!("Role:  {}", p.role);
            })
        }
    }
}
