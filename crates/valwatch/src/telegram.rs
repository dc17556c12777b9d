//! Telegram Bot API transport.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use valwatch_core::{ChatId, DeliveryError};

use crate::notify::ChatTransport;

const BLOCKED_MARKER: &str = "bot was blocked by the user";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Thin client for the Bot API `sendMessage` method.
pub struct TelegramClient {
    http: reqwest::Client,
    base: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: format!("https://api.telegram.org/bot{token}"),
        }
    }

    fn home_menu_markup() -> serde_json::Value {
        serde_json::json!({
            "keyboard": [[{"text": "📡 My Nodes"}, {"text": "🗳 Governance"}]],
            "resize_keyboard": true
        })
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send(
        &self,
        chat_id: ChatId,
        text: &str,
        with_home_menu: bool,
    ) -> Result<(), DeliveryError> {
        let mut payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });
        if with_home_menu {
            payload["reply_markup"] = Self::home_menu_markup();
        }

        let response = self
            .http
            .post(format!("{}/sendMessage", self.base))
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Other(e.to_string()))?;

        let status = response.status();
        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::Other(e.to_string()))?;

        if body.ok {
            debug!(chat_id, "Message delivered");
            return Ok(());
        }

        let description = body.description.unwrap_or_else(|| status.to_string());
        if description.contains(BLOCKED_MARKER) {
            Err(DeliveryError::Blocked)
        } else {
            Err(DeliveryError::Other(description))
        }
    }
}
