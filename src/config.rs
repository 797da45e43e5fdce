//! Service configuration.
//!
//! Layered lowest to highest: struct defaults, `config/default.toml`,
//! `STOREFRONT__*` environment variables, then the flat `STOREFRONT_*`
//! overrides below for the keys deployments set most often.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use history_service::HistoryConfig;
use history_store::StoreConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Auth gateway base URL; empty or "mock" accepts `user_<id>` tokens.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    #[serde(default)]
    pub database: StoreConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}

fn default_auth_url() -> String {
    "http://auth-gateway:8000".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth_url: default_auth_url(),
            database: StoreConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let layered = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Self::default())?)
            .add_source(
                ::config::File::with_name("config/default")
                    .required(false)
                    .format(::config::FileFormat::Toml),
            )
            .add_source(
                ::config::Environment::with_prefix("STOREFRONT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let mut cfg: Self = layered
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        cfg.apply_env(|name| std::env::var(name).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        override_from(&lookup, "STOREFRONT_DATABASE_URL", &mut self.database.url)?;
        override_from(
            &lookup,
            "STOREFRONT_DATABASE_MAX_CONNECTIONS",
            &mut self.database.max_connections,
        )?;
        override_from(&lookup, "STOREFRONT_AUTH_URL", &mut self.auth_url)?;
        override_from(
            &lookup,
            "STOREFRONT_HISTORY_DEFAULT_LIMIT",
            &mut self.history.default_limit,
        )?;
        override_from(
            &lookup,
            "STOREFRONT_HISTORY_MAX_LIMIT",
            &mut self.history.max_limit,
        )?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.history.default_limit < 1 || self.history.max_limit < 1 {
            bail!("history limits must be positive");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be at least 1");
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .context("Invalid server address")
    }

    pub fn mock_auth(&self) -> bool {
        self.auth_url.is_empty() || self.auth_url == "mock"
    }
}

fn override_from<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, slot: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: Display,
{
    if let Some(raw) = lookup(name) {
        *slot = raw.parse().map_err(|e| anyhow!("{name}: {e}"))?;
    }
    Ok(())
}
