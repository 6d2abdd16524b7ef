// src/telegram_client.rs
// Telegram Bot API client: the chat transport for inbound updates and outbound messages

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::conversation::OutboundSink;
use crate::models::telegram::{
    ApiResponse, GetUpdatesRequest, KeyboardButton, Message, ReplyMarkup, SendMessageRequest,
    SendPhotoRequest, SetWebhookRequest, Update,
};
use crate::presentation::{Keyboard, OutboundMessage};

/// Telegram rejects longer message texts.
pub const MAX_MESSAGE_LEN: usize = 4096;

const API_URL: &str = "https://api.telegram.org";

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Telegram API error ({code:?}): {description}")]
    Api {
        code: Option<i32>,
        description: String,
    },
}

impl TelegramError {
    fn is_transient(&self) -> bool {
        match self {
            TelegramError::Http(e) => e.is_connect() || e.is_timeout(),
            TelegramError::Api { code, .. } => matches!(code, Some(429) | Some(500..=599)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self, reqwest::Error> {
        // Must outlive the long-poll timeout.
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", API_URL, token),
        })
    }

    async fn call<P, R>(&self, method: &str, payload: &P) -> Result<R, TelegramError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response: ApiResponse<R> = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(payload)
            .send()
            .await?
            .json()
            .await?;

        match response {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                error_code,
                description,
                ..
            } => Err(TelegramError::Api {
                code: error_code,
                description: description.unwrap_or_else(|| format!("{} returned no result", method)),
            }),
        }
    }

    /// Outbound sends retry transient failures with exponential backoff.
    async fn call_with_retry<P, R>(&self, method: &str, payload: &P) -> Result<R, TelegramError>
    where
        P: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let backoff_config = ExponentialBackoff {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(10),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let operation = || async {
            self.call(method, payload).await.map_err(|e| {
                if e.is_transient() {
                    tracing::warn!("Telegram {} failed (retrying): {}", method, e);
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        };

        retry(backoff_config, operation).await
    }

    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: vec!["message"],
        };
        self.call("getUpdates", &request).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<Message, TelegramError> {
        let markup = keyboard.map(reply_markup);
        let request = SendMessageRequest {
            chat_id,
            text,
            reply_markup: markup.as_ref(),
        };
        self.call_with_retry("sendMessage", &request).await
    }

    pub async fn send_photo(&self, chat_id: i64, uri: &str) -> Result<Message, TelegramError> {
        let request = SendPhotoRequest { chat_id, photo: uri };
        self.call_with_retry("sendPhoto", &request).await
    }

    pub async fn set_webhook(&self, url: &str) -> Result<bool, TelegramError> {
        self.call("setWebhook", &SetWebhookRequest { url }).await
    }

    pub async fn delete_webhook(&self) -> Result<bool, TelegramError> {
        self.call("deleteWebhook", &serde_json::json!({})).await
    }
}

#[async_trait]
impl OutboundSink for TelegramClient {
    async fn deliver(&self, user_id: i64, message: &OutboundMessage) -> Result<(), String> {
        match message {
            OutboundMessage::Photo { uri } => {
                self.send_photo(user_id, uri).await.map_err(|e| e.to_string())?;
            }
            OutboundMessage::Text { body, keyboard } => {
                let chunks = split_message(body, MAX_MESSAGE_LEN);
                let last = chunks.len().saturating_sub(1);
                for (i, chunk) in chunks.iter().enumerate() {
                    let keyboard = if i == last { *keyboard } else { None };
                    self.send_message(user_id, chunk, keyboard)
                        .await
                        .map_err(|e| e.to_string())?;
                }
            }
        }
        Ok(())
    }
}

/// One button per row, shrunk to fit.
pub fn reply_markup(keyboard: Keyboard) -> ReplyMarkup {
    ReplyMarkup {
        keyboard: keyboard
            .options()
            .iter()
            .map(|option| {
                vec![KeyboardButton {
                    text: option.to_string(),
                }]
            })
            .collect(),
        resize_keyboard: true,
    }
}

/// Splits `text` into pieces of at most `limit` bytes, preferring line breaks.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        let needed = if current.is_empty() { line.len() } else { current.len() + 1 + line.len() };
        if needed <= limit {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        // A single line longer than the limit is cut on char boundaries.
        let mut rest = line;
        while rest.len() > limit {
            let mut cut = limit;
            while !rest.is_char_boundary(cut) {
                cut -= 1;
            }
            chunks.push(rest[..cut].to_string());
            rest = &rest[cut..];
        }
        current.push_str(rest);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
