//! # Bot Configuration Module
//!
//! This module defines the configuration loaded once at startup from the
//! process environment: the Telegram token, the optional admin identity,
//! the ordered list of enabled AI providers and the update transport.

use anyhow::{anyhow, bail, Context, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

// Constants for bot configuration
pub const DEFAULT_WEBHOOK_PORT: u16 = 8443;
pub const DEFAULT_MAX_TOKENS: u32 = 300;
pub const PERPLEXITY_TIMEOUT_SECS: u64 = 30;

/// The AI backends the bot knows how to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Perplexity,
    HuggingFace,
}

impl ProviderKind {
    /// Every provider kind, in the default fallback order
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Gemini,
        ProviderKind::OpenAi,
        ProviderKind::Perplexity,
        ProviderKind::HuggingFace,
    ];

    /// Name shown to users in replies and in the health report
    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Gemini",
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Perplexity => "Perplexity",
            ProviderKind::HuggingFace => "HuggingFace",
        }
    }

    /// Marker prefixed to every answer produced by this provider
    pub fn marker(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "🟢",
            ProviderKind::OpenAi => "🔵",
            ProviderKind::Perplexity => "🟣",
            ProviderKind::HuggingFace => "🟡",
        }
    }

    /// Environment variable holding the credential that enables this provider
    pub fn credential_var(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Perplexity => "PERPLEXITY_API_KEY",
            ProviderKind::HuggingFace => "HF_TOKEN",
        }
    }

    /// Prefix of the per-provider tunables (`<PREFIX>_MODEL`, `<PREFIX>_MAX_TOKENS`, ...)
    pub fn env_prefix(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI",
            ProviderKind::OpenAi => "OPENAI",
            ProviderKind::Perplexity => "PERPLEXITY",
            ProviderKind::HuggingFace => "HF",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-1.5-flash",
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Perplexity => "sonar-small-chat",
            ProviderKind::HuggingFace => "mistralai/Mistral-7B-Instruct-v0.2",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Perplexity => "https://api.perplexity.ai",
            ProviderKind::HuggingFace => "https://api-inference.huggingface.co/models",
        }
    }

    /// Only Perplexity carries an explicit per-call timeout by default
    pub fn default_timeout(self) -> Option<Duration> {
        match self {
            ProviderKind::Perplexity => Some(Duration::from_secs(PERPLEXITY_TIMEOUT_SECS)),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            "perplexity" => Ok(ProviderKind::Perplexity),
            "huggingface" | "hf" => Ok(ProviderKind::HuggingFace),
            other => Err(anyhow!("Unknown provider: {other}")),
        }
    }
}

/// Settings for one enabled provider
#[derive(Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: String,
    /// Generation limit sent with every request (max output / new tokens)
    pub max_tokens: u32,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl ProviderSettings {
    /// Settings with the built-in defaults for `kind`
    pub fn with_defaults(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            model: kind.default_model().to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: kind.default_base_url().to_string(),
            timeout: kind.default_timeout(),
        }
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("kind", &self.kind)
            .field("api_key", &mask_secret(&self.api_key))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Webhook transport settings
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Public base URL Telegram posts updates to; the bot token is appended as the route
    pub base_url: Url,
    pub port: u16,
    pub secret_token: Option<String>,
}

impl WebhookConfig {
    /// Full webhook URL, keyed by the bot token
    pub fn endpoint(&self, bot_token: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{bot_token}")).context("Invalid webhook endpoint URL")
    }
}

/// How updates reach the bot
#[derive(Debug, Clone)]
pub enum TransportMode {
    Polling,
    Webhook(WebhookConfig),
}

/// Configuration structure built once at startup
#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: String,
    /// Only this Telegram user may run `/health` when set
    pub admin_id: Option<u64>,
    /// Enabled providers, in fallback order
    pub providers: Vec<ProviderSettings>,
    pub transport: TransportMode,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &mask_secret(&self.bot_token))
            .field("admin_id", &self.admin_id)
            .field("providers", &self.providers)
            .field("transport", &self.transport)
            .finish()
    }
}

impl BotConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable lookup
    ///
    /// Blank values are treated as absent, so an empty credential keeps its
    /// provider disabled.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bot_token = var("BOT_TOKEN")
            .or_else(|| var("TELEGRAM_BOT_TOKEN"))
            .ok_or_else(|| anyhow!("BOT_TOKEN must be set"))?;

        let admin_id = match var("ADMIN_ID") {
            Some(raw) => {
                let id: u64 = raw
                    .parse()
                    .with_context(|| format!("ADMIN_ID must be a numeric Telegram user id, got {raw:?}"))?;
                (id != 0).then_some(id)
            }
            None => None,
        };

        let order = match var("PROVIDER_ORDER") {
            Some(raw) => parse_provider_order(&raw)?,
            None => ProviderKind::ALL.to_vec(),
        };

        let mut providers = Vec::new();
        for kind in order {
            let Some(api_key) = var(kind.credential_var()) else {
                continue;
            };

            let prefix = kind.env_prefix();
            let mut settings = ProviderSettings::with_defaults(kind, api_key);
            if let Some(model) = var(format!("{prefix}_MODEL").as_str()) {
                settings.model = model;
            }
            if let Some(raw) = var(format!("{prefix}_MAX_TOKENS").as_str()) {
                settings.max_tokens = raw
                    .parse()
                    .with_context(|| format!("{prefix}_MAX_TOKENS must be a positive integer"))?;
            }
            if let Some(base_url) = var(format!("{prefix}_BASE_URL").as_str()) {
                settings.base_url = base_url.trim_end_matches('/').to_string();
            }
            if let Some(raw) = var(format!("{prefix}_TIMEOUT_SECS").as_str()) {
                let secs: u64 = raw
                    .parse()
                    .with_context(|| format!("{prefix}_TIMEOUT_SECS must be a number of seconds"))?;
                settings.timeout = (secs > 0).then(|| Duration::from_secs(secs));
            }
            providers.push(settings);
        }

        let transport = match var("BOT_MODE").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("polling") => TransportMode::Polling,
            Some("webhook") => {
                let raw_url = var("WEBHOOK_URL")
                    .ok_or_else(|| anyhow!("WEBHOOK_URL must be set when BOT_MODE=webhook"))?;
                let base_url = Url::parse(&raw_url).context("WEBHOOK_URL is not a valid URL")?;
                let port = match var("PORT") {
                    Some(raw) => raw.parse().context("PORT must be a valid port number")?,
                    None => DEFAULT_WEBHOOK_PORT,
                };
                TransportMode::Webhook(WebhookConfig {
                    base_url,
                    port,
                    secret_token: var("WEBHOOK_SECRET"),
                })
            }
            Some(other) => bail!("BOT_MODE must be 'polling' or 'webhook', got {other:?}"),
        };

        Ok(Self {
            bot_token,
            admin_id,
            providers,
            transport,
        })
    }

    /// Whether the credential for `kind` is configured
    pub fn is_enabled(&self, kind: ProviderKind) -> bool {
        self.providers.iter().any(|settings| settings.kind == kind)
    }

    /// Whether `user_id` may run admin-only commands
    pub fn is_authorized_admin(&self, user_id: Option<u64>) -> bool {
        match self.admin_id {
            None => true,
            Some(admin) => user_id == Some(admin),
        }
    }
}

/// Parse a comma-separated provider list
///
/// Duplicates are dropped and kinds left out are appended in default order,
/// so every provider with a credential is still tried.
pub fn parse_provider_order(raw: &str) -> Result<Vec<ProviderKind>> {
    let mut order = Vec::new();
    for name in raw.split(',').filter(|name| !name.trim().is_empty()) {
        let kind: ProviderKind = name.parse().context("Invalid PROVIDER_ORDER")?;
        if !order.contains(&kind) {
            order.push(kind);
        }
    }
    for kind in ProviderKind::ALL {
        if !order.contains(&kind) {
            order.push(kind);
        }
    }
    Ok(order)
}

/// Hide all but the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}
