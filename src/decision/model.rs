use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::constants::{events, llm};
use crate::error::DecisionError;

use super::Decision;

/// Anything that can answer a system prompt + user input with text.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, system_prompt: &str, user_input: &str) -> Result<String, DecisionError>;
}

/// Decision provider backed by a generative model.
#[derive(Clone)]
pub struct ModelDecider {
    backend: Arc<dyn ChatBackend>,
    /// `None` when the backend enforces its own per-call timeout
    timeout: Option<Duration>,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl fmt::Debug for ModelDecider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDecider")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .finish_non_exhaustive()
    }
}

impl ModelDecider {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            timeout: Some(Duration::from_secs(llm::DEFAULT_TIMEOUT_SECS)),
            max_retries: llm::DEFAULT_MAX_RETRIES,
            retry_base_delay: Duration::from_millis(llm::RETRY_BASE_DELAY_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Leave timing to the backend, e.g. an `LLMQueue` that times only the
    /// network call and not the wait for a free slot.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_base_delay = base_delay;
        self
    }

    /// Ask the model about `news`. Any failure resolves to HOLD.
    pub async fn decide(&self, news: &str) -> Decision {
        match self.request(news).await {
            Ok(reply) => {
                let decision = parse_reply(&reply);
                debug!("🤖 [MODEL] Reply {:?} -> {}", reply.trim(), decision);
                decision
            }
            Err(e) => {
                warn!(
                    event = events::DECISION_FALLBACK,
                    "⚠️ [MODEL] Decision request failed, defaulting to HOLD: {}", e
                );
                Decision::Hold
            }
        }
    }

    async fn request(&self, news: &str) -> Result<String, DecisionError> {
        let prompt = build_prompt(news);
        let mut attempt: u32 = 0;

        loop {
            match self.attempt(&prompt).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self
                        .retry_base_delay
                        .saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    warn!(
                        event = events::DECISION_RETRY,
                        "🔁 [MODEL] Attempt {} failed ({}), retrying in {:?}", attempt, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<String, DecisionError> {
        let call = self.backend.chat(llm::SYSTEM_PROMPT, prompt);
        let Some(timeout) = self.timeout else {
            return call.await;
        };
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(DecisionError::Timeout {
                secs: timeout.as_secs(),
            }),
        }
    }
}

pub fn build_prompt(news: &str) -> String {
    format!(
        "Analyze this news headline: '{}'. Decide if you should BUY, SELL, or HOLD.",
        news
    )
}

/// Map a free-text model reply to a decision: BUY wins over SELL, anything else is HOLD.
pub fn parse_reply(reply: &str) -> Decision {
    let normalized = reply.trim().to_uppercase();
    if normalized.contains("BUY") {
        Decision::Buy
    } else if normalized.contains("SELL") {
        Decision::Sell
    } else {
        Decision::Hold
    }
}
