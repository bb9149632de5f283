//! Telegram Bot API delivery and update polling.

use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::{AppError, Result};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Message parse mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct BotCommand<'a> {
    command: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct SetMyCommandsRequest<'a> {
    commands: Vec<BotCommand<'a>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct TelegramResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<T>,
}

/// One entry from `getUpdates`. Only message updates are requested.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Sends text messages through a bot, to its configured chat or any other.
pub struct TelegramSender {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramSender {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self> {
        Self::with_api_base(TELEGRAM_API_BASE, bot_token, chat_id)
    }

    /// Sender against a non-default Bot API server.
    pub fn with_api_base(
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self> {
        let bot_token = bot_token.into();
        if bot_token.trim().is_empty() {
            return Err(AppError::Config("TELEGRAM_BOT_TOKEN is not set".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token,
            chat_id: chat_id.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    /// Send `text` to the configured chat.
    pub async fn send_message(&self, text: &str, parse_mode: Option<ParseMode>) -> Result<()> {
        self.send_message_to(&self.chat_id, text, parse_mode).await
    }

    /// Send `text` to `chat_id`.
    pub async fn send_message_to(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<()> {
        if text.trim().is_empty() {
            return Err(AppError::Telegram("message text is empty".to_string()));
        }
        if chat_id.trim().is_empty() {
            return Err(AppError::Telegram("chat id is not set".to_string()));
        }

        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode,
        };

        debug!("Sending Telegram message ({} chars)", text.chars().count());
        self.call::<_, IgnoredAny>("sendMessage", &request, None).await?;
        info!("Telegram message sent to chat {}", chat_id);
        Ok(())
    }

    /// Long-poll for new message updates, starting at `offset`.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };

        let wait = Duration::from_secs(timeout_secs + REQUEST_TIMEOUT_SECS);
        let updates = self
            .call::<_, Vec<Update>>("getUpdates", &request, Some(wait))
            .await?
            .unwrap_or_default();

        if !updates.is_empty() {
            debug!("Received {} update(s)", updates.len());
        }
        Ok(updates)
    }

    /// Register the command menu shown by Telegram clients.
    pub async fn set_my_commands(&self, commands: &[(&str, &str)]) -> Result<()> {
        let request = SetMyCommandsRequest {
            commands: commands
                .iter()
                .map(|&(command, description)| BotCommand {
                    command,
                    description,
                })
                .collect(),
        };

        self.call::<_, IgnoredAny>("setMyCommands", &request, None).await?;
        info!("Registered {} bot command(s)", commands.len());
        Ok(())
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Option<Duration>) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.method_url(method)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;

        // Telegram reports failures as `ok: false` with a 4xx status, so read the body either way.
        let status = response.status();
        let body: TelegramResponse<T> = response.json().await.map_err(|e| {
            AppError::Telegram(format!("unreadable {} response ({}): {}", method, status, e))
        })?;

        check_response(body)
    }
}

fn check_response<T>(body: TelegramResponse<T>) -> Result<Option<T>> {
    if body.ok {
        return Ok(body.result);
    }
    let description = body
        .description
        .unwrap_or_else(|| "unknown error".to_string());
    error!("Telegram request failed: {}", description);
    Err(AppError::Telegram(description))
}
