//! # Tsukuyomi Telegram Bot
//!
//! A Telegram bot that forwards user text to several AI completion
//! providers in priority order and replies with the first answer.

pub mod bot;
pub mod config;
pub mod localization;
pub mod logging;
pub mod provider_errors;
pub mod providers;
pub mod responder;
pub mod transport;
