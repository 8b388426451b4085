use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::models::{NewDeal, Stage};

#[derive(Subcommand)]
pub enum DealsCommands {
    #[command(about = "List deals, newest first")]
    List,

    #[command(about = "Create a deal")]
    Add {
        #[arg(help = "Deal title")]
        title: String,
        #[arg(long, help = "Deal value")]
        amount: Option<f64>,
        #[arg(long, help = "new, qualified, won or lost")]
        stage: Option<Stage>,
    },

    #[command(about = "Move a deal to another stage")]
    Stage {
        #[arg(help = "Deal ID")]
        id: i64,
        #[arg(help = "new, qualified, won or lost")]
        stage: Stage,
    },
}

pub async fn handle(cmd: DealsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = authenticated_client()?;

    match cmd {
        DealsCommands::List => {
            let deals = client.list_deals().await?;
            if deals.is_empty() {
                return output_empty_collection(&output_format, "No deals found");
            }
            output_value(&output_format, &deals, |deals| {
                println!("{:<8} {:<30} {:>14} {}", "ID", "TITLE", "AMOUNT", "STAGE");
                println!("{}", "-".repeat(65));
                for deal in deals {
                    println!("{:<8} {:<30} {:>14.2} {}", deal.id, deal.title, deal.amount, deal.stage);
                }
            })
        }
        DealsCommands::Add { title, amount, stage } => {
            let id = client.create_deal(&NewDeal { title, amount, stage }).await?;
            output_success(&output_format, &format!("Created deal {}", id), Some(json!({ "id": id })))
        }
        DealsCommands::Stage { id, stage } => {
            client.set_deal_stage(id, stage).await?;
            output_success(
                &output_format,
                &format!("Deal {} moved to {}", id, stage),
                Some(json!({ "id": id, "stage": stage })),
            )
        }
    }
}
