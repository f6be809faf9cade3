//! # Transport Module
//!
//! Wires the message handler into a teloxide dispatcher and feeds it
//! updates, either by long polling or through a webhook served by axum.

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use teloxide::dispatching::{DefaultKey, UpdateHandler};
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use tracing::{error, info};

use crate::bot::message_handler;
use crate::config::{BotConfig, TransportMode, WebhookConfig};
use crate::responder::Responder;

/// Body of the webhook liveness route
pub const LIVENESS_TEXT: &str = "🌙 Project Tsukuyomi is running";

/// Every text update goes to the message handler
pub fn schema() -> UpdateHandler<anyhow::Error> {
    Update::filter_message().endpoint(message_handler)
}

pub fn build_dispatcher(
    bot: Bot,
    responder: Arc<Responder>,
    config: Arc<BotConfig>,
) -> Dispatcher<Bot, anyhow::Error, DefaultKey> {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![responder, config])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
}

pub async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

/// `GET /` answers with a fixed liveness string
pub fn liveness_router() -> Router {
    Router::new().route("/", get(liveness))
}

/// Run the bot with the configured transport until shutdown
pub async fn run(bot: Bot, responder: Arc<Responder>, config: Arc<BotConfig>) -> Result<()> {
    let mut dispatcher = build_dispatcher(bot.clone(), responder, Arc::clone(&config));

    match &config.transport {
        TransportMode::Polling => {
            info!("Starting long polling");
            dispatcher.dispatch().await;
        }
        TransportMode::Webhook(webhook) => {
            run_webhook(bot, &mut dispatcher, webhook, &config.bot_token).await?;
        }
    }

    info!("Dispatcher stopped");
    Ok(())
}

async fn run_webhook(
    bot: Bot,
    dispatcher: &mut Dispatcher<Bot, anyhow::Error, DefaultKey>,
    webhook: &WebhookConfig,
    bot_token: &str,
) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], webhook.port));
    let url = webhook.endpoint(bot_token)?;

    let mut options = webhooks::Options::new(addr, url);
    if let Some(secret) = &webhook.secret_token {
        options = options.secret_token(secret.clone());
    }

    // Registers the webhook with Telegram and returns the update route
    let (listener, stop_flag, router) = webhooks::axum_to_router(bot, options).await?;
    let app = router.merge(liveness_router());

    let tcp = tokio::net::TcpListener::bind(addr).await?;
    info!(port = webhook.port, "Webhook server listening");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(tcp, app).with_graceful_shutdown(stop_flag).await {
            error!(error = %e, "Webhook server failed");
        }
    });

    dispatcher
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    Ok(())
}
