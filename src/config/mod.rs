use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Secret used when `JWT_SECRET` is unset. Only accepted outside staging/production.
pub const DEV_JWT_SECRET: &str = "devsecret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in {0:?} environment")]
    MissingJwtSecret(Environment),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_secs: i64,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            Some("test") => Environment::Test,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Test => Self::test(),
            Environment::Development => Self::development(),
        };

        config.with_overrides(&lookup)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("CRM_API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse("PORT", &v)?;
        }

        // Database overrides
        self.database.url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts(lookup)?,
        };
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs = parse("DATABASE_ACQUIRE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = parse("DATABASE_RUN_MIGRATIONS", &v)?;
        }

        // API overrides
        if let Some(v) = lookup("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = parse("API_ENABLE_RATE_LIMITING", &v)?;
        }
        if let Some(v) = lookup("API_RATE_LIMIT_REQUESTS") {
            self.api.rate_limit_requests = parse("API_RATE_LIMIT_REQUESTS", &v)?;
        }
        if let Some(v) = lookup("API_RATE_LIMIT_WINDOW_SECS") {
            self.api.rate_limit_window_secs = parse("API_RATE_LIMIT_WINDOW_SECS", &v)?;
        }
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = parse("API_MAX_REQUEST_SIZE_BYTES", &v)?;
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("JWT_EXPIRY_SECS") {
            self.security.jwt_expiry_secs = parse("JWT_EXPIRY_SECS", &v)?;
        }
        if let Some(v) = lookup("BCRYPT_COST") {
            let cost: u32 = parse("BCRYPT_COST", &v)?;
            if !(4..=31).contains(&cost) {
                return Err(ConfigError::InvalidValue { name: "BCRYPT_COST", value: v });
            }
            self.security.bcrypt_cost = cost;
        }

        self.security.jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => match self.environment {
                Environment::Development | Environment::Test => {
                    tracing::warn!("JWT_SECRET not set, using insecure development secret");
                    DEV_JWT_SECRET.to_string()
                }
                env => return Err(ConfigError::MissingJwtSecret(env)),
            },
        };

        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                acquire_timeout_secs: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 300,
                rate_limit_window_secs: 15 * 60,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_secs: 60 * 60,
                bcrypt_cost: 10,
            },
        }
    }

    fn test() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Test;
        config.api.rate_limit_requests = 1000;
        config.api.rate_limit_window_secs = 1;
        // Minimum bcrypt cost keeps test suites fast
        config.security.bcrypt_cost = 4;
        config
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                acquire_timeout_secs: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 300,
                rate_limit_window_secs: 15 * 60,
                max_request_size_bytes: 512 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_secs: 60 * 60,
                bcrypt_cost: 10,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                acquire_timeout_secs: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 300,
                rate_limit_window_secs: 15 * 60,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_secs: 60 * 60,
                bcrypt_cost: 12,
            },
        }
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

/// Assemble a connection URL from the discrete DB_* variables.
fn database_url_from_parts<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("DB_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let port = lookup("DB_PORT").unwrap_or_else(|| "5432".to_string());
    let user = lookup("DB_USER").unwrap_or_else(|| "postgres".to_string());
    let password = lookup("DB_PASSWORD").unwrap_or_default();
    let name = lookup("DB_NAME").unwrap_or_else(|| "crm_dev".to_string());

    let invalid = |name: &'static str, value: &str| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    };

    let mut url = url::Url::parse("postgres://localhost").map_err(|_| invalid("DB_HOST", &host))?;
    url.set_host(Some(host.trim()))
        .map_err(|_| invalid("DB_HOST", &host))?;
    let port: u16 = parse("DB_PORT", &port)?;
    url.set_port(Some(port))
        .map_err(|_| invalid("DB_PORT", &port.to_string()))?;
    url.set_username(&user)
        .map_err(|_| invalid("DB_USER", &user))?;
    if !password.is_empty() {
        url.set_password(Some(&password))
            .map_err(|_| invalid("DB_PASSWORD", "<redacted>"))?;
    }
    url.set_path(&format!("/{}", name));
    if lookup("DB_SSL").as_deref() == Some("true") {
        url.set_query(Some("sslmode=require"));
    }
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.security.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.security.jwt_expiry_secs, 3600);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.url, "postgres://postgres@127.0.0.1:5432/crm_dev");
    }

    #[test]
    fn test_production_requires_jwt_secret() {
        let err = AppConfig::from_lookup(lookup_from(&[("APP_ENV", "production")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingJwtSecret(Environment::Production)));

        let config = AppConfig::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();
        assert_eq!(config.security.jwt_secret, "s3cret");
        assert!(config.api.enable_rate_limiting);
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("APP_ENV", "test"),
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://u:p@db:5432/crm_test"),
            ("API_ENABLE_RATE_LIMITING", "false"),
            ("SECURITY_CORS_ORIGINS", "http://a.test, http://b.test"),
        ]))
        .unwrap();
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "postgres://u:p@db:5432/crm_test");
        assert!(!config.api.enable_rate_limiting);
        assert_eq!(config.security.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.security.bcrypt_cost, 4);
    }

    #[test]
    fn test_database_url_from_parts() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DB_HOST", "db.internal"),
            ("DB_USER", "crm"),
            ("DB_PASSWORD", "pw"),
            ("DB_NAME", "crm_prod"),
            ("DB_SSL", "true"),
        ]))
        .unwrap();
        assert_eq!(
            config.database.url,
            "postgres://crm:pw@db.internal:5432/crm_prod?sslmode=require"
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "PORT", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[("BCRYPT_COST", "2")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "BCRYPT_COST", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[("DB_HOST", "bad host name")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "DB_HOST", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[("DB_PORT", "not-a-port")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "DB_PORT", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[("DB_PORT", "70000")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "DB_PORT", .. }));
    }
}
