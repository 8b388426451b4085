use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_session, save_session};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::client::CrmClient;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Switch to server (persistent selection) or show current server")]
    Use {
        #[arg(help = "Server base URL, e.g. http://localhost:3000")]
        url: Option<String>,
    },

    #[command(about = "Check server health status from API /health endpoint")]
    Health,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Use { url: Some(url) } => {
            // Validate before persisting
            CrmClient::new(&url)?;

            let mut session = load_session()?;
            if session.server_url != url {
                // Tokens are only valid for the server that issued them
                session.log_out();
            }
            session.server_url = url.clone();
            save_session(&session)?;

            output_success(
                &output_format,
                &format!("Switched to server '{}'", url),
                Some(json!({ "server_url": url })),
            )
        }
        ServerCommands::Use { url: None } => {
            let session = load_session()?;
            output_value(&output_format, &json!({ "server_url": session.server_url }), |_| {
                println!("Current server: {}", session.server_url);
            })
        }
        ServerCommands::Health => {
            let client = anonymous_client()?;
            let health = client.health().await?;
            output_value(&output_format, &health, |health| {
                let db = if health.db { "up" } else { "down" };
                let status = if health.ok { "ok" } else { "degraded" };
                println!("{}: {} (database {})", client.base_url(), status, db);
            })?;

            if !health.ok {
                anyhow::bail!("server is degraded");
            }
            Ok(())
        }
    }
}
