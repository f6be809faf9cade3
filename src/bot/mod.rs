//! Bot module for handling Telegram interactions
//!
//! - `message_handler`: routes commands and forwards prompts to the responder
//! - `ui_builder`: formats replies, help and the health report

pub mod message_handler;
pub mod ui_builder;

// Re-export main handler function for use in the transport layer
pub use message_handler::message_handler;

pub use message_handler::{answer_prompt, handle_health, parse_command, ChatReply, Command, ReplySink};
pub use ui_builder::{format_health_report, format_outcome, format_provider_result, split_message};
