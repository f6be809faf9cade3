//! Google Gemini provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{non_empty, send_json, with_timeout, Provider};
use crate::config::ProviderSettings;
use crate::provider_errors::ProviderError;

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, joined
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        Some(text)
    }
}

pub struct GeminiProvider {
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(settings: ProviderSettings, client: reqwest::Client) -> Self {
        Self { settings, client }
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        self.settings.kind.display_name()
    }

    fn marker(&self) -> &str {
        self.settings.kind.marker()
    }

    #[instrument(skip(self, prompt), fields(model = %self.settings.model))]
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.base_url, self.settings.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.settings.max_tokens,
            },
        };

        let request = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&body);

        // Blocked prompts come back as 200 with no candidates; that counts as empty.
        let response: GenerateContentResponse =
            send_json(self.name(), with_timeout(request, self.settings.timeout)).await?;
        non_empty(response.into_text())
    }
}
