//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use tsukuyomi::bot::ReplySink;
use tsukuyomi::provider_errors::ProviderError;
use tsukuyomi::providers::Provider;

/// Provider that returns a fixed reply after an optional delay and counts its calls
pub struct ScriptedProvider {
    name: String,
    marker: String,
    reply: Result<String, ProviderError>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn answering(name: &str, text: &str) -> Self {
        Self::new(name, Ok(text.to_string()))
    }

    pub fn failing(name: &str, error: ProviderError) -> Self {
        Self::new(name, Err(error))
    }

    fn new(name: &str, reply: Result<String, ProviderError>) -> Self {
        Self {
            name: name.to_string(),
            marker: "🧪".to_string(),
            reply,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared call counter, readable after the provider is boxed
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn marker(&self) -> &str {
        &self.marker
    }

    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone()
    }
}

pub fn call_count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}

/// Reply sink that records every message
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn send_text(&self, text: String) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(text);
        Ok(())
    }
}

/// Lookup over a fixed set of variables, for `BotConfig::from_lookup`
pub fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

/// Base URL of a server that accepts connections and never answers
pub async fn silent_server_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

pub fn boxed(provider: ScriptedProvider) -> Box<dyn Provider> {
    Box::new(provider)
}
