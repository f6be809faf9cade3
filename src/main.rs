use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;

use tsukuyomi::config::{BotConfig, TransportMode};
use tsukuyomi::responder::Responder;
use tsukuyomi::{logging, transport};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    logging::init_tracing()?;

    info!("Starting Project Tsukuyomi Telegram Bot");

    let config = BotConfig::from_env().context("Invalid bot configuration")?;

    // One HTTP client shared by every provider
    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let responder = Responder::from_config(&config, client);
    info!(
        providers = ?responder.provider_names(),
        admin_gated = config.admin_id.is_some(),
        webhook = matches!(config.transport, TransportMode::Webhook(_)),
        "Configuration loaded"
    );

    let bot = Bot::new(config.bot_token.clone());

    transport::run(bot, Arc::new(responder), Arc::new(config)).await
}
