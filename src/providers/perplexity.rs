//! Perplexity search-augmented provider
//!
//! Same chat-completion shape as OpenAI, but carries its own 30 second
//! timeout by default and treats any non-2xx status as a failure.

use async_trait::async_trait;
use tracing::instrument;

use super::chat::{ChatCompletionRequest, ChatCompletionResponse};
use super::{non_empty, send_json, with_timeout, Provider};
use crate::config::ProviderSettings;
use crate::provider_errors::ProviderError;

pub struct PerplexityProvider {
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl PerplexityProvider {
    pub fn new(settings: ProviderSettings, client: reqwest::Client) -> Self {
        Self { settings, client }
    }

    /// The fixed completions endpoint
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url)
    }
}

#[async_trait]
impl Provider for PerplexityProvider {
    fn name(&self) -> &str {
        self.settings.kind.display_name()
    }

    fn marker(&self) -> &str {
        self.settings.kind.marker()
    }

    #[instrument(skip(self, prompt), fields(model = %self.settings.model))]
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = ChatCompletionRequest::single_turn(
            &self.settings.model,
            prompt,
            self.settings.max_tokens,
        );

        let request = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&body);

        let response: ChatCompletionResponse =
            send_json(self.name(), with_timeout(request, self.settings.timeout)).await?;
        non_empty(response.into_first_content()?)
    }
}
