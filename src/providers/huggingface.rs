//! Hugging Face hosted-inference provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{non_empty, send_json, with_timeout, Provider};
use crate::config::ProviderSettings;
use crate::provider_errors::ProviderError;

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    return_full_text: bool,
}

#[derive(Debug, Serialize)]
struct TextGenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: Option<String>,
}

/// The inference API answers with a list, some deployments with a bare object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextGenerationResponse {
    Many(Vec<GeneratedText>),
    One(GeneratedText),
}

impl TextGenerationResponse {
    fn into_text(self) -> Option<String> {
        match self {
            TextGenerationResponse::Many(items) => items.into_iter().next()?.generated_text,
            TextGenerationResponse::One(item) => item.generated_text,
        }
    }
}

pub struct HuggingFaceProvider {
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl HuggingFaceProvider {
    pub fn new(settings: ProviderSettings, client: reqwest::Client) -> Self {
        Self { settings, client }
    }
}

#[async_trait]
impl Provider for HuggingFaceProvider {
    fn name(&self) -> &str {
        self.settings.kind.display_name()
    }

    fn marker(&self) -> &str {
        self.settings.kind.marker()
    }

    #[instrument(skip(self, prompt), fields(model = %self.settings.model))]
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/{}", self.settings.base_url, self.settings.model);
        let body = TextGenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: self.settings.max_tokens,
                return_full_text: false,
            },
        };

        let request = self
            .client
            .post(url)
            .bearer_auth(&self.settings.api_key)
            .json(&body);

        let response: TextGenerationResponse =
            send_json(self.name(), with_timeout(request, self.settings.timeout)).await?;
        non_empty(response.into_text())
    }
}
