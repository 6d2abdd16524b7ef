// src/error.rs
use thiserror::Error;

use crate::config::ConfigError;
use crate::telegram_client::TelegramError;

/// Startup and run-loop failures. Per-turn faults never reach this type.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Telegram error: {0}")]
    Telegram(#[from] TelegramError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
