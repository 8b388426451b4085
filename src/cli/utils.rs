use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::config::load_session;
use crate::cli::OutputFormat;
use crate::client::CrmClient;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print `value` as JSON, or hand it to `text` for the human-readable form
pub fn output_value<T, F>(output_format: &OutputFormat, value: &T, text: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(value),
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("[]"),
        OutputFormat::Text => println!("{}", message),
    }
    Ok(())
}

/// Use the provided password or prompt for one without echo
pub fn resolve_password(provided: Option<String>, confirm: bool) -> anyhow::Result<String> {
    if let Some(password) = provided {
        return Ok(password);
    }

    let prompt = dialoguer::Password::new().with_prompt("Password");
    let prompt = if confirm {
        prompt.with_confirmation("Confirm password", "Passwords do not match")
    } else {
        prompt
    };
    Ok(prompt.interact()?)
}

/// Client for the selected server, without credentials
pub fn anonymous_client() -> anyhow::Result<CrmClient> {
    let session = load_session()?;
    Ok(CrmClient::new(&session.server_url)?)
}

/// Client for the selected server carrying the stored token
pub fn authenticated_client() -> anyhow::Result<CrmClient> {
    let session = load_session()?;
    let token = session
        .token
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `crm auth login <email>` first"))?;
    Ok(CrmClient::new(&session.server_url)?.with_token(token))
}
