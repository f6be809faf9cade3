//! AI provider clients
//!
//! Every backend implements [`Provider`], so the responder can walk them in
//! order without knowing how each one is called:
//! - `gemini`: Google Gemini `generateContent`
//! - `openai`: OpenAI chat completions
//! - `perplexity`: Perplexity chat completions
//! - `huggingface`: Hugging Face hosted inference

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::{BotConfig, ProviderKind, ProviderSettings};
use crate::provider_errors::ProviderError;

pub mod chat;
pub mod gemini;
pub mod huggingface;
pub mod openai;
pub mod perplexity;

pub use gemini::GeminiProvider;
pub use huggingface::HuggingFaceProvider;
pub use openai::OpenAiProvider;
pub use perplexity::PerplexityProvider;

/// A text-completion backend the responder can fall back through
#[async_trait]
pub trait Provider: Send + Sync {
    /// Display name used in replies and logs
    fn name(&self) -> &str;

    /// Marker prefixed to answers from this provider
    fn marker(&self) -> &str;

    /// Send a single-turn prompt and return the generated text
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Build a client for one provider from its settings
pub fn build_provider(settings: ProviderSettings, client: reqwest::Client) -> Box<dyn Provider> {
    match settings.kind {
        ProviderKind::Gemini => Box::new(GeminiProvider::new(settings, client)),
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new(settings, client)),
        ProviderKind::Perplexity => Box::new(PerplexityProvider::new(settings, client)),
        ProviderKind::HuggingFace => Box::new(HuggingFaceProvider::new(settings, client)),
    }
}

/// Build the enabled providers, in fallback order
///
/// All providers share one HTTP client (and its connection pool).
pub fn build_providers(config: &BotConfig, client: reqwest::Client) -> Vec<Box<dyn Provider>> {
    config
        .providers
        .iter()
        .cloned()
        .map(|settings| build_provider(settings, client.clone()))
        .collect()
}

/// Apply the provider's per-call timeout, if it has one
pub(crate) fn with_timeout(request: RequestBuilder, timeout: Option<Duration>) -> RequestBuilder {
    match timeout {
        Some(timeout) => request.timeout(timeout),
        None => request,
    }
}

/// Send a request and decode a JSON body, mapping non-2xx statuses to errors
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    debug!(provider, status = status.as_u16(), body_len = body.len(), "Provider responded");

    if !status.is_success() {
        return Err(ProviderError::status(status.as_u16(), &body));
    }

    Ok(serde_json::from_str(&body)?)
}

/// Trim generated text and reject blank answers
pub(crate) fn non_empty(text: Option<String>) -> Result<String, ProviderError> {
    match text.map(|text| text.trim().to_string()) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ProviderError::EmptyResponse),
    }
}
