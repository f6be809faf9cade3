//! # Responder Module
//!
//! Walks the configured providers in priority order and returns the first
//! usable answer. Each attempt is its own error boundary: a failing provider
//! is logged and skipped, never surfaced to the caller.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::BotConfig;
use crate::providers::{build_providers, Provider};

/// A successful answer from one provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResult {
    pub provider_name: String,
    pub marker: String,
    /// Duration of the successful call only
    pub elapsed: Duration,
    pub text: String,
}

impl ProviderResult {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// What a resolution produced
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackOutcome {
    Answered(ProviderResult),
    /// Every enabled provider failed, or none is enabled
    Exhausted,
}

/// Ordered provider fallback
pub struct Responder {
    providers: Vec<Box<dyn Provider>>,
}

impl Responder {
    /// Create a responder over providers already in priority order
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// Build the enabled providers from configuration
    pub fn from_config(config: &BotConfig, client: reqwest::Client) -> Self {
        Self::new(build_providers(config, client))
    }

    /// Names of the providers that will be tried, in order
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }

    /// Try each provider in turn until one returns non-empty text
    pub async fn resolve(&self, prompt: &str) -> FallbackOutcome {
        if self.providers.is_empty() {
            warn!("No AI providers configured");
            return FallbackOutcome::Exhausted;
        }

        for provider in &self.providers {
            let name = provider.name();
            debug!(provider = name, "Trying provider");

            let start = Instant::now();
            match provider.complete(prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    let elapsed = start.elapsed();
                    info!(
                        provider = name,
                        elapsed_ms = elapsed.as_millis() as u64,
                        response_len = text.len(),
                        "Provider answered"
                    );
                    return FallbackOutcome::Answered(ProviderResult {
                        provider_name: name.to_string(),
                        marker: provider.marker().to_string(),
                        elapsed,
                        text,
                    });
                }
                Ok(_) => {
                    warn!(provider = name, "Provider failed: empty response");
                }
                Err(e) => {
                    warn!(provider = name, error = %e, "Provider failed");
                }
            }
        }

        warn!(attempted = self.providers.len(), "All AI providers failed");
        FallbackOutcome::Exhausted
    }
}
