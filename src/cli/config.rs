// CLI session state: which server to talk to and the token from the last login.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub server_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
            email: None,
        }
    }
}

impl Session {
    pub fn log_in(&mut self, email: &str, token: String) {
        self.email = Some(email.to_string());
        self.token = Some(token);
    }

    pub fn log_out(&mut self) {
        self.email = None;
        self.token = None;
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("CRM_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("crm").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session() -> anyhow::Result<Session> {
    load_session_from(&get_config_dir()?.join("session.json"))
}

pub fn save_session(session: &Session) -> anyhow::Result<()> {
    save_session_to(&get_config_dir()?.join("session.json"), session)
}

pub fn load_session_from(path: &Path) -> anyhow::Result<Session> {
    if !path.exists() {
        return Ok(Session::default());
    }

    let content = fs::read_to_string(path)?;
    let session: Session = serde_json::from_str(&content)?;
    Ok(session)
}

pub fn save_session_to(path: &Path, session: &Session) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(session)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_default_session() {
        let path = std::env::temp_dir().join("crm-cli-session-does-not-exist.json");
        let session = load_session_from(&path).unwrap();
        assert_eq!(session, Session::default());
    }

    #[test]
    fn session_persists_token() {
        let path = std::env::temp_dir().join(format!("crm-cli-session-{}.json", std::process::id()));
        let mut session = Session::default();
        session.log_in("demo@example.com", "tok".to_string());
        save_session_to(&path, &session).unwrap();

        let loaded = load_session_from(&path).unwrap();
        assert_eq!(loaded.token.as_deref(), Some("tok"));
        assert_eq!(loaded.email.as_deref(), Some("demo@example.com"));

        let mut loaded = loaded;
        loaded.log_out();
        assert_eq!(loaded.token, None);
        let _ = fs::remove_file(&path);
    }
}
