//! # Provider Tests
//!
//! Each HTTP provider against a local mock server, plus the end-to-end
//! fallback scenario built from configuration.

mod common;

use common::{lookup, silent_server_url};
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;
use tsukuyomi::config::{BotConfig, ProviderKind, ProviderSettings};
use tsukuyomi::provider_errors::ProviderError;
use tsukuyomi::providers::{
    GeminiProvider, HuggingFaceProvider, OpenAiProvider, PerplexityProvider, Provider,
};
use tsukuyomi::responder::{FallbackOutcome, Responder};

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(kind: ProviderKind, key: &str, base_url: String) -> ProviderSettings {
        let mut settings = ProviderSettings::with_defaults(kind, key);
        settings.base_url = base_url;
        settings
    }

    /// Perplexity sends bearer auth and the chat body, reads choices[0]
    #[tokio::test]
    async fn test_perplexity_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer pplx-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "sonar-small-chat",
                "messages": [{"role": "user", "content": "hi"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#)
            .create_async()
            .await;

        let provider = PerplexityProvider::new(
            settings(ProviderKind::Perplexity, "pplx-key", server.url()),
            reqwest::Client::new(),
        );

        assert_eq!(provider.name(), "Perplexity");
        assert_eq!(provider.complete("hi").await, Ok("hello".to_string()));
        mock.assert_async().await;
    }

    /// Any non-2xx status is a failure carrying the status code
    #[tokio::test]
    async fn test_perplexity_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":"invalid api key"}"#)
            .create_async()
            .await;

        let provider = PerplexityProvider::new(
            settings(ProviderKind::Perplexity, "bad", server.url()),
            reqwest::Client::new(),
        );

        match provider.complete("hi").await {
            Err(ProviderError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid api key"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    /// OpenAI sends model and max_tokens
    #[tokio::test]
    async fn test_openai_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 300
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"  from openai  "}}]}"#)
            .create_async()
            .await;

        let provider = OpenAiProvider::new(
            settings(ProviderKind::OpenAi, "sk-test", server.url()),
            reqwest::Client::new(),
        );

        assert_eq!(provider.complete("hi").await, Ok("from openai".to_string()));
        mock.assert_async().await;
    }

    /// A null message content is an empty response
    #[tokio::test]
    async fn test_openai_null_content_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":null}}]}"#)
            .create_async()
            .await;

        let provider = OpenAiProvider::new(
            settings(ProviderKind::OpenAi, "sk-test", server.url()),
            reqwest::Client::new(),
        );

        assert_eq!(provider.complete("hi").await, Err(ProviderError::EmptyResponse));
    }

    /// Gemini uses the key header and the generation limit
    #[tokio::test]
    async fn test_gemini_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-1.5-flash:generateContent")
            .match_header("x-goog-api-key", "gem-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "generationConfig": {"maxOutputTokens": 300}
            })))
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"gemini says hi"}]}}]}"#)
            .create_async()
            .await;

        let provider = GeminiProvider::new(
            settings(ProviderKind::Gemini, "gem-key", server.url()),
            reqwest::Client::new(),
        );

        assert_eq!(provider.complete("hi").await, Ok("gemini says hi".to_string()));
        mock.assert_async().await;
    }

    /// A response body that is not JSON is malformed
    #[tokio::test]
    async fn test_gemini_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/gemini-1.5-flash:generateContent")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let provider = GeminiProvider::new(
            settings(ProviderKind::Gemini, "gem-key", server.url()),
            reqwest::Client::new(),
        );

        assert!(matches!(
            provider.complete("hi").await,
            Err(ProviderError::Malformed(_))
        ));
    }

    /// Hugging Face posts to the model path with max_new_tokens
    #[tokio::test]
    async fn test_huggingface_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/mistralai/Mistral-7B-Instruct-v0.2")
            .match_header("authorization", "Bearer hf_token")
            .match_body(Matcher::PartialJson(json!({
                "inputs": "hi",
                "parameters": {"max_new_tokens": 300, "return_full_text": false}
            })))
            .with_status(200)
            .with_body(r#"[{"generated_text":" mistral answer"}]"#)
            .create_async()
            .await;

        let provider = HuggingFaceProvider::new(
            settings(ProviderKind::HuggingFace, "hf_token", server.url()),
            reqwest::Client::new(),
        );

        assert_eq!(provider.complete("hi").await, Ok("mistral answer".to_string()));
        mock.assert_async().await;
    }

    /// The per-call timeout turns a hung server into a timeout error
    #[tokio::test]
    async fn test_timeout_is_reported() {
        let mut provider_settings =
            settings(ProviderKind::Gemini, "gem-key", silent_server_url().await);
        provider_settings.timeout = Some(Duration::from_millis(200));

        let provider = GeminiProvider::new(provider_settings, reqwest::Client::new());

        assert!(matches!(
            provider.complete("hi").await,
            Err(ProviderError::Timeout(_))
        ));
    }

    /// Gemini times out, Perplexity answers "hello": the reply comes from Perplexity
    #[tokio::test]
    async fn test_gemini_timeout_falls_back_to_perplexity() {
        let gemini_url = silent_server_url().await;

        let mut perplexity = mockito::Server::new_async().await;
        let perplexity_mock = perplexity
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"hello"}}]}"#)
            .expect(1)
            .create_async()
            .await;
        let perplexity_url = perplexity.url();

        let config = BotConfig::from_lookup(lookup(&[
            ("BOT_TOKEN", "123:abc"),
            ("GEMINI_API_KEY", "gem-key"),
            ("GEMINI_BASE_URL", gemini_url.as_str()),
            ("GEMINI_TIMEOUT_SECS", "1"),
            ("PERPLEXITY_API_KEY", "pplx-key"),
            ("PERPLEXITY_BASE_URL", perplexity_url.as_str()),
        ]))
        .unwrap();

        let responder = Responder::from_config(&config, reqwest::Client::new());
        assert_eq!(responder.provider_names(), vec!["Gemini", "Perplexity"]);

        let FallbackOutcome::Answered(result) = responder.resolve("hi").await else {
            panic!("expected Perplexity to answer");
        };
        assert_eq!(result.text, "hello");
        assert_eq!(result.provider_name, "Perplexity");
        assert_eq!(result.marker, ProviderKind::Perplexity.marker());
        assert!(result.elapsed < Duration::from_secs(1));
        perplexity_mock.assert_async().await;
    }

    /// Providers after the first success are never contacted
    #[tokio::test]
    async fn test_later_providers_not_called_after_success() {
        let mut openai = mockito::Server::new_async().await;
        let openai_mock = openai
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"first"}}]}"#)
            .expect(1)
            .create_async()
            .await;

        let mut huggingface = mockito::Server::new_async().await;
        let hf_mock = huggingface
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let openai_url = openai.url();
        let hf_url = huggingface.url();
        let config = BotConfig::from_lookup(lookup(&[
            ("BOT_TOKEN", "123:abc"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", openai_url.as_str()),
            ("HF_TOKEN", "hf_token"),
            ("HF_BASE_URL", hf_url.as_str()),
        ]))
        .unwrap();

        let responder = Responder::from_config(&config, reqwest::Client::new());
        let FallbackOutcome::Answered(result) = responder.resolve("hi").await else {
            panic!("expected OpenAI to answer");
        };
        assert_eq!(result.provider_name, "OpenAI");

        openai_mock.assert_async().await;
        hf_mock.assert_async().await;
    }
}
