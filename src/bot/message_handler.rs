//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, info};

// Import localization
use crate::localization::t_lang;

use crate::config::BotConfig;
use crate::responder::{FallbackOutcome, Responder};

// Import UI builder functions
use super::ui_builder::{
    format_health_report, format_help, format_outcome, split_message, TELEGRAM_MESSAGE_LIMIT,
};

/// Commands the bot answers itself instead of forwarding to a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Health,
    Unknown(String),
}

/// Parse `/command` or `/command@botname`; `None` for ordinary text
pub fn parse_command(text: &str) -> Option<Command> {
    let head = text.trim_start().split_whitespace().next()?;
    let name = head.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name).to_ascii_lowercase();

    Some(match name.as_str() {
        "start" => Command::Start,
        "help" => Command::Help,
        "health" => Command::Health,
        _ => Command::Unknown(name),
    })
}

/// Where replies to one conversation are delivered
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send_text(&self, text: String) -> Result<()>;
}

/// Replies into a Telegram chat
pub struct ChatReply {
    bot: Bot,
    chat_id: ChatId,
}

impl ChatReply {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl ReplySink for ChatReply {
    async fn send_text(&self, text: String) -> Result<()> {
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }
}

/// Send the thinking notice, resolve the prompt and deliver the answer
pub async fn answer_prompt<S: ReplySink + ?Sized>(
    sink: &S,
    responder: &Responder,
    prompt: &str,
    language_code: Option<&str>,
) -> Result<FallbackOutcome> {
    sink.send_text(t_lang("thinking", language_code)).await?;

    let outcome = responder.resolve(prompt).await;

    let reply = format_outcome(&outcome, language_code);
    for chunk in split_message(&reply, TELEGRAM_MESSAGE_LIMIT) {
        sink.send_text(chunk).await?;
    }

    Ok(outcome)
}

/// Report provider credentials; silently ignored for anyone but the admin
///
/// Returns whether a report was sent.
pub async fn handle_health<S: ReplySink + ?Sized>(
    sink: &S,
    config: &BotConfig,
    user_id: Option<u64>,
    language_code: Option<&str>,
) -> Result<bool> {
    if !config.is_authorized_admin(user_id) {
        info!(user_id = ?user_id, "Ignoring /health from non-admin user");
        return Ok(false);
    }

    sink.send_text(format_health_report(config, language_code))
        .await?;
    Ok(true)
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    responder: Arc<Responder>,
    config: Arc<BotConfig>,
) -> Result<()> {
    let Some(text) = msg.text() else {
        debug!(user_id = %msg.chat.id, "Ignoring non-text message");
        return Ok(());
    };

    // Extract user's language code from Telegram
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_ref())
        .map(|s| s.as_str());
    let user_id = msg.from.as_ref().map(|user| user.id.0);

    let sink = ChatReply::new(bot, msg.chat.id);

    match parse_command(text) {
        Some(Command::Start) => {
            sink.send_text(t_lang("welcome", language_code)).await?;
        }
        Some(Command::Help) => {
            sink.send_text(format_help(&responder.provider_names(), language_code))
                .await?;
        }
        Some(Command::Health) => {
            handle_health(&sink, &config, user_id, language_code).await?;
        }
        Some(Command::Unknown(name)) => {
            debug!(user_id = %msg.chat.id, command = %name, "Ignoring unknown command");
        }
        None => {
            debug!(user_id = %msg.chat.id, message_length = text.len(), "Received prompt from user");
            answer_prompt(&sink, &responder, text, language_code).await?;
        }
    }

    Ok(())
}
