use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::models::{Contact, ContactChanges, ContactQuery, NewContact};

#[derive(Subcommand)]
pub enum ContactsCommands {
    #[command(about = "List contacts, newest first")]
    List {
        #[arg(long, help = "Page number (from 1)")]
        page: Option<i64>,
        #[arg(long, help = "Page size (1-100)")]
        limit: Option<i64>,
        #[arg(long, help = "Case-insensitive name filter")]
        search: Option<String>,
        #[arg(long, help = "Include pagination totals")]
        paged: bool,
    },

    #[command(about = "Create a contact")]
    Add {
        #[arg(help = "Contact name")]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    #[command(about = "Change selected fields of a contact")]
    Update {
        #[arg(help = "Contact ID")]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    #[command(about = "Delete a contact")]
    Delete {
        #[arg(help = "Contact ID")]
        id: i64,
    },
}

fn print_table(contacts: &[Contact]) {
    println!("{:<8} {:<25} {:<30} {}", "ID", "NAME", "EMAIL", "PHONE");
    println!("{}", "-".repeat(80));
    for contact in contacts {
        println!(
            "{:<8} {:<25} {:<30} {}",
            contact.id, contact.name, contact.email, contact.phone
        );
    }
}

pub async fn handle(cmd: ContactsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = authenticated_client()?;

    match cmd {
        ContactsCommands::List { page, limit, search, paged } => {
            let query = ContactQuery { page, limit, search };

            if paged {
                let page = client.list_contacts_paged(&query).await?;
                return output_value(&output_format, &page, |p| {
                    print_table(&p.items);
                    println!("\nPage {} ({} per page), {} total", p.page, p.limit, p.total);
                });
            }

            let contacts = client.list_contacts(&query).await?;
            if contacts.is_empty() {
                return output_empty_collection(&output_format, "No contacts found");
            }
            output_value(&output_format, &contacts, |c| print_table(c))
        }
        ContactsCommands::Add { name, email, phone } => {
            let id = client.create_contact(&NewContact { name, email, phone }).await?;
            output_success(&output_format, &format!("Created contact {}", id), Some(json!({ "id": id })))
        }
        ContactsCommands::Update { id, name, email, phone } => {
            let changes = ContactChanges { name, email, phone };
            if changes.is_empty() {
                anyhow::bail!("Nothing to update: pass at least one of --name, --email, --phone");
            }
            client.update_contact(id, &changes).await?;
            output_success(&output_format, &format!("Updated contact {}", id), Some(json!({ "id": id })))
        }
        ContactsCommands::Delete { id } => {
            client.delete_contact(id).await?;
            output_success(&output_format, &format!("Deleted contact {}", id), Some(json!({ "id": id })))
        }
    }
}
