use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";

/// Long-poll window for getUpdates, in seconds.
pub const LONG_POLL_TIMEOUT_SECS: u64 = 60;

/// Destination for finished report text.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
    token: String,
    chat_id: i64,
    request_timeout: Duration,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

impl TelegramClient {
    pub fn new(token: String, chat_id: i64, request_timeout: Duration) -> Self {
        Self::with_base_url(TELEGRAM_API_BASE_URL, token, chat_id, request_timeout)
    }

    pub fn with_base_url(base_url: &str, token: String, chat_id: i64, request_timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            chat_id,
            request_timeout,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// The bot account behind the token.
    pub async fn get_me(&self) -> Result<BotUser> {
        let resp = self
            .http
            .get(self.method_url("getMe"))
            .timeout(self.request_timeout)
            .send()
            .await
            .context("Telegram getMe request failed")?;
        unwrap_response(resp.json().await.context("Telegram getMe decode failed")?)
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "Markdown",
        };

        let resp = self
            .http
            .post(self.method_url("sendMessage"))
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .context("Telegram sendMessage request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("Telegram API non-2xx: {status} body={text}");
        }
        Ok(())
    }

    /// Long-poll for new messages. The HTTP timeout is stretched past the
    /// poll window so an idle poll is not reported as an error.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let body = GetUpdatesRequest {
            offset,
            timeout: LONG_POLL_TIMEOUT_SECS,
            allowed_updates: &["message"],
        };

        let resp = self
            .http
            .post(self.method_url("getUpdates"))
            .timeout(Duration::from_secs(LONG_POLL_TIMEOUT_SECS) + self.request_timeout)
            .json(&body)
            .send()
            .await
            .context("Telegram getUpdates request failed")?;

        unwrap_response(resp.json().await.context("Telegram getUpdates decode failed")?)
    }
}

fn unwrap_response<T>(resp: ApiResponse<T>) -> Result<T> {
    match (resp.ok, resp.result) {
        (true, Some(result)) => Ok(result),
        _ => bail!(
            "Telegram API error: {}",
            resp.description.unwrap_or_else(|| "no description".to_string())
        ),
    }
}

#[async_trait]
impl MessageSink for TelegramClient {
    /// Send to the configured chat.
    async fn send(&self, text: &str) -> Result<()> {
        if self.chat_id == 0 {
            bail!("chat ID not set");
        }
        self.send_message(self.chat_id, text).await
    }
}
