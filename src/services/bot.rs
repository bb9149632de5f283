//! Chat commands: /start, /help and /rate.
//!
//! Polls the Bot API for messages and answers recognised commands in the
//! chat they came from. Anything else is ignored.

use chrono::{NaiveTime, Timelike};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::services::notifier::Notifier;
use crate::services::telegram::{ParseMode, TelegramSender, Update};

const POLL_TIMEOUT_SECS: u64 = 30;
const RETRY_DELAY_SECS: u64 = 5;

pub const NO_DATA_MESSAGE: &str = "📭 환율 데이터가 없습니다.";
pub const RATE_ERROR_MESSAGE: &str = "⚠️ 환율 조회 중 오류가 발생했습니다.";

/// Menu entries registered with `setMyCommands`.
pub const MENU_COMMANDS: [(&str, &str); 3] = [
    ("rate", "💱 금일 환율 조회"),
    ("help", "❓ 명령어 안내"),
    ("start", "👋 시작 메시지"),
];

/// Recognised chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Rate,
}

impl Command {
    /// Parse the first word of a message. Accepts the `/cmd@BotName` form
    /// used in group chats.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "rate" => Some(Command::Rate),
            _ => None,
        }
    }
}

/// "오후 2:00" style clock for chat text.
fn korean_clock(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    let half = if is_pm { "오후" } else { "오전" };
    format!("{} {}:{:02}", half, hour, time.minute())
}

/// Answers chat commands from the rate store.
pub struct CommandBot {
    telegram: TelegramSender,
    notifier: Arc<Notifier>,
    run_at: NaiveTime,
}

impl CommandBot {
    pub fn new(telegram: TelegramSender, notifier: Arc<Notifier>, run_at: NaiveTime) -> Self {
        Self {
            telegram,
            notifier,
            run_at,
        }
    }

    pub fn welcome_message(&self) -> String {
        format!(
            "👋 안녕하세요! <b>환율 알림 봇</b>입니다.\n\n\
             📊 매일 {}(KST)에 환율 정보와 매수 신호를 알려드립니다.\n\n\
             💵 달러(USD)\n\
             💴 엔화(JPY)\n\n\
             📌 <b>명령어 안내</b>\n\
             /rate - 금일 환율 조회\n\n\
             하단 메뉴에서도 사용할 수 있어요 🙂",
            korean_clock(self.run_at)
        )
    }

    pub fn help_message(&self) -> String {
        format!(
            "📌 <b>명령어 안내</b>\n\n\
             /rate - 💱 금일 환율 조회\n\
             /help - ❓ 명령어 안내\n\
             /start - 👋 시작 메시지\n\n\
             📊 매일 {}(KST)에 환율 알림이 자동 전송됩니다.\n\
             🚨 매수 타이밍 감지 시 신호 메시지도 함께 전송됩니다.",
            korean_clock(self.run_at)
        )
    }

    /// Report for the latest stored day, or a short notice.
    pub fn rate_message(&self) -> String {
        match self.notifier.latest_report_message() {
            Ok(Some(message)) => message,
            Ok(None) => NO_DATA_MESSAGE.to_string(),
            Err(e) => {
                error!("/rate lookup failed: {}", e);
                RATE_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// Reply for a chat message, or `None` when it is not a command.
    pub fn reply_to(&self, text: &str) -> Option<String> {
        let command = Command::parse(text)?;
        debug!("Command {:?}", command);

        Some(match command {
            Command::Start => self.welcome_message(),
            Command::Help => self.help_message(),
            Command::Rate => self.rate_message(),
        })
    }

    async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(reply) = message.text.as_deref().and_then(|t| self.reply_to(t)) else {
            return;
        };

        let chat_id = message.chat.id.to_string();
        if let Err(e) = self
            .telegram
            .send_message_to(&chat_id, &reply, Some(ParseMode::Html))
            .await
        {
            error!("Reply to chat {} failed: {}", chat_id, e);
        }
    }

    /// Register the menu, then poll and answer forever.
    pub async fn run(self) {
        info!("Command bot started");
        if let Err(e) = self.telegram.set_my_commands(&MENU_COMMANDS).await {
            warn!("Registering bot commands failed: {}", e);
        }

        let mut offset: Option<i64> = None;
        loop {
            match self.telegram.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.handle_update(update).await;
                    }
                }
                Err(e) => {
                    warn!("Polling updates failed, retrying in {}s: {}", RETRY_DELAY_SECS, e);
                    tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECS)).await;
                }
            }
        }
    }
}
