// src/config.rs
//! Process configuration, read once at startup from the environment.

use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8443;
const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// How updates reach the bot.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryMode {
    /// Long-poll `getUpdates`.
    Polling,
    /// Telegram pushes updates to `public_url`, served on `port`.
    Webhook { public_url: String, port: u16 },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_token: String,
    pub database_url: String,
    pub cocktail_api_key: Option<String>,
    pub delivery: DeliveryMode,
    pub catalog_timeout: Duration,
    /// `None` keeps sessions for the lifetime of the process.
    pub session_idle_ttl: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let telegram_token = required("TELEGRAM_TOKEN")?;
        let database_url = required("DATABASE_URL")?;
        let cocktail_api_key = optional("COCKTAIL_DB_API_KEY");

        let port = match optional("PORT") {
            Some(raw) => parse_number::<u16>("PORT", &raw)?,
            None => DEFAULT_PORT,
        };
        let delivery = match optional("WEBHOOK_URL") {
            Some(public_url) => DeliveryMode::Webhook {
                public_url: public_url.trim_end_matches('/').to_string(),
                port,
            },
            None => DeliveryMode::Polling,
        };

        let catalog_timeout = match optional("CATALOG_TIMEOUT_SECS") {
            Some(raw) => match parse_number::<u64>("CATALOG_TIMEOUT_SECS", &raw)? {
                0 => {
                    return Err(ConfigError::Invalid {
                        name: "CATALOG_TIMEOUT_SECS",
                        value: raw,
                    })
                }
                secs => Duration::from_secs(secs),
            },
            None => Duration::from_secs(DEFAULT_CATALOG_TIMEOUT_SECS),
        };

        let ttl_secs = match optional("SESSION_IDLE_TTL_SECS") {
            Some(raw) => parse_number::<u64>("SESSION_IDLE_TTL_SECS", &raw)?,
            None => DEFAULT_SESSION_IDLE_TTL_SECS,
        };
        let session_idle_ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));

        Ok(Self {
            telegram_token,
            database_url,
            cocktail_api_key,
            delivery,
            catalog_timeout,
            session_idle_ttl,
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}
