use balcao_persist::MssqlConfig;
use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub environment: RunMode,
    #[serde(default)]
    pub server: ServerConfig,
    pub database: MssqlConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Controls whether error bodies carry driver details
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RunMode {
    Development,
    #[default]
    Production,
}

impl From<String> for RunMode {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "development" | "dev" => RunMode::Development,
            _ => RunMode::Production,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Flat variables the deployed service has always read, with their config keys
const REQUIRED_DATABASE_VARS: [(&str, &str); 4] = [
    ("database.host", "DB_HOST"),
    ("database.user", "DB_USER"),
    ("database.password", "DB_PASS"),
    ("database.database", "DB_NAME"),
];

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml
    /// 3. APP__SECTION__KEY environment variables
    /// 4. DB_HOST, DB_PORT, DB_USER, DB_PASS, DB_NAME, DB_ENCRYPT, PORT, ENV/NODE_ENV
    pub fn load() -> Result<Self, ConfigError> {
        let mode = env_var("ENV").or_else(|| env_var("NODE_ENV"));
        let profile = mode.clone().unwrap_or_else(|| "production".to_string());

        let encrypt = env_var("DB_ENCRYPT");

        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", profile)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.host", env_var("DB_HOST"))?
            .set_override_option("database.port", env_var("DB_PORT"))?
            .set_override_option("database.user", env_var("DB_USER"))?
            .set_override_option("database.password", env_var("DB_PASS"))?
            .set_override_option("database.database", env_var("DB_NAME"))?
            .set_override_option("database.encrypt", encrypt.as_deref().map(|v| v == "true"))?
            .set_override_option(
                "database.trust_server_certificate",
                encrypt.as_deref().map(|v| v == "false"),
            )?
            .set_override_option("server.port", env_var("PORT"))?
            .set_override_option("environment", mode)?
            .build()?;

        for (key, var) in REQUIRED_DATABASE_VARS {
            if config.get_string(key).map(|v| v.is_empty()).unwrap_or(true) {
                return Err(ConfigError::Message(format!(
                    "{} environment variable is required",
                    var
                )));
            }
        }

        config.try_deserialize()
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn is_development(&self) -> bool {
        self.environment == RunMode::Development
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
