//! OpenAI chat-completion provider

use async_trait::async_trait;
use tracing::instrument;

use super::chat::{ChatCompletionRequest, ChatCompletionResponse};
use super::{non_empty, send_json, with_timeout, Provider};
use crate::config::ProviderSettings;
use crate::provider_errors::ProviderError;

pub struct OpenAiProvider {
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(settings: ProviderSettings, client: reqwest::Client) -> Self {
        Self { settings, client }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        self.settings.kind.display_name()
    }

    fn marker(&self) -> &str {
        self.settings.kind.marker()
    }

    #[instrument(skip(self, prompt), fields(model = %self.settings.model))]
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.settings.base_url);
        let body = ChatCompletionRequest::single_turn(
            &self.settings.model,
            prompt,
            self.settings.max_tokens,
        );

        let request = self
            .client
            .post(url)
            .bearer_auth(&self.settings.api_key)
            .json(&body);

        let response: ChatCompletionResponse =
            send_json(self.name(), with_timeout(request, self.settings.timeout)).await?;
        non_empty(response.into_first_content()?)
    }
}
