//! UI Builder module for formatting replies

use crate::config::{BotConfig, ProviderKind};
use crate::localization::{t_args_lang, t_lang};
use crate::responder::{FallbackOutcome, ProviderResult};

/// Telegram rejects messages longer than this many UTF-16 code units
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// `"🟣 Perplexity (1.23s)\n\n<answer>"`
pub fn format_provider_result(result: &ProviderResult) -> String {
    format!(
        "{} {} ({:.2}s)\n\n{}",
        result.marker,
        result.provider_name,
        result.elapsed_seconds(),
        result.text
    )
}

/// Reply text for a resolution, the failure sentinel when nothing answered
pub fn format_outcome(outcome: &FallbackOutcome, language_code: Option<&str>) -> String {
    match outcome {
        FallbackOutcome::Answered(result) => format_provider_result(result),
        FallbackOutcome::Exhausted => t_lang("all-failed", language_code),
    }
}

/// One `Name: ✅/❌` line per provider, credential configured or not
pub fn format_health_report(config: &BotConfig, language_code: Option<&str>) -> String {
    let mut status = String::new();
    for kind in ProviderKind::ALL {
        let icon = if config.is_enabled(kind) { "✅" } else { "❌" };
        status.push_str(&format!("{}: {}\n", kind.display_name(), icon));
    }

    format!("{}\n\n{}", t_lang("health-title", language_code), status)
}

pub fn format_help(provider_names: &[&str], language_code: Option<&str>) -> String {
    let providers = if provider_names.is_empty() {
        t_lang("help-no-providers", language_code)
    } else {
        let joined = provider_names.join(" → ");
        t_args_lang("help-providers", &[("providers", joined.as_str())], language_code)
    };

    [
        t_lang("help-title", language_code),
        t_lang("help-description", language_code),
        providers,
        t_lang("help-commands", language_code),
    ]
    .join("\n\n")
}

/// Split a reply into Telegram-sized messages, preferring line boundaries
///
/// Lines longer than `limit` are cut between characters. Whitespace-only
/// chunks are dropped since Telegram refuses empty messages.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.encode_utf16().count();

        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > limit {
            for ch in line.chars() {
                let ch_len = ch.len_utf16();
                if current_len + ch_len > limit {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push(ch);
                current_len += ch_len;
            }
        } else {
            current.push_str(line);
            current_len += line_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
        .into_iter()
        .map(|chunk| chunk.trim_end().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect()
}
