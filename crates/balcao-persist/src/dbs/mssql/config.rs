use std::fmt;

use serde::Deserialize;
use tiberius::{AuthMethod, Config, EncryptionLevel};

#[derive(Clone, Deserialize)]
pub struct MssqlConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default)]
    pub encrypt: bool,
    /// Defaults to trusting the certificate whenever encryption is off
    #[serde(default)]
    pub trust_server_certificate: Option<bool>,
    #[serde(default)]
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_pool_max")]
    pub max: u32,
    #[serde(default)]
    pub min: u32,
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max: default_pool_max(),
            min: 0,
            idle_timeout_ms: default_idle_timeout_ms(),
        }
    }
}

fn default_port() -> u16 {
    1433
}

fn default_pool_max() -> u32 {
    10
}

fn default_idle_timeout_ms() -> u64 {
    30_000
}

impl MssqlConfig {
    pub fn trusts_certificate(&self) -> bool {
        self.trust_server_certificate.unwrap_or(!self.encrypt)
    }

    pub(crate) fn to_tiberius(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.host);
        config.port(self.port);
        config.database(&self.database);
        config.authentication(AuthMethod::sql_server(&self.user, &self.password));

        if self.encrypt {
            config.encryption(EncryptionLevel::Required);
        } else {
            config.encryption(EncryptionLevel::Off);
        }
        if self.trusts_certificate() {
            config.trust_cert();
        }

        config
    }
}

impl fmt::Debug for MssqlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MssqlConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("encrypt", &self.encrypt)
            .field("trust_server_certificate", &self.trusts_certificate())
            .field("pool", &self.pool)
            .finish()
    }
}
