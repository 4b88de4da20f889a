//! Trade-intent providers
//!
//! A `DecisionProvider` turns the tick's headline into a `Decision`. The
//! variant is picked once, at construction, from `decision.provider`:
//! either the keyword heuristic or a language model behind a `ChatBackend`.
//!
//! `decide` never fails. Every backend problem (missing reply, transport
//! error, timeout) is logged and resolved to `Decision::Hold`.

pub mod heuristic;
pub mod model;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::config::{AppConfig, ProviderKind};
use crate::error::SimError;
use crate::llm::{LLMClient, LLMQueue};

pub use heuristic::KeywordHeuristic;
pub use model::{parse_reply, ChatBackend, ModelDecider};

/// What a trader wants to do this tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Buy => "BUY",
            Decision::Sell => "SELL",
            Decision::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug)]
pub enum DecisionProvider {
    Heuristic(KeywordHeuristic),
    Model(ModelDecider),
}

impl DecisionProvider {
    /// Build the provider selected in config.
    ///
    /// The model variant refuses to start without an API key. Spawns the
    /// LLM queue processor, so it must be called inside a tokio runtime.
    pub fn from_config(config: &AppConfig) -> Result<Self, SimError> {
        match config.decision.provider {
            ProviderKind::Heuristic => Ok(DecisionProvider::Heuristic(KeywordHeuristic::new(
                &config.decision.bullish_keywords,
                &config.decision.bearish_keywords,
            ))),
            ProviderKind::Llm => {
                let llm = &config.llm;
                let api_key = llm
                    .api_key
                    .clone()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| SimError::MissingCredential {
                        provider: "llm".to_string(),
                    })?;

                if let Some(url) = &llm.base_url {
                    info!("🤖 Using Custom OpenAI Base URL: {}", url);
                }
                info!(
                    "📬 Initializing LLM Queue (model: {}, max concurrent: {}, size: {})...",
                    llm.model, llm.max_concurrent, llm.queue_size
                );

                let client = LLMClient::new(api_key, llm.base_url.clone(), llm.model.clone());
                let queue = LLMQueue::new(
                    Arc::new(client),
                    llm.max_concurrent,
                    llm.queue_size,
                    Duration::from_secs(llm.timeout_secs),
                );

                // The queue times each network call; waiting for a slot is not a failure
                let decider = ModelDecider::new(Arc::new(queue))
                    .without_timeout()
                    .with_retries(llm.max_retries, Duration::from_millis(llm.retry_base_delay_ms));
                Ok(DecisionProvider::Model(decider))
            }
        }
    }

    pub async fn decide(&self, news: &str) -> Decision {
        match self {
            DecisionProvider::Heuristic(h) => h.decide(news),
            DecisionProvider::Model(m) => m.decide(news).await,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DecisionProvider::Heuristic(_) => "heuristic",
            DecisionProvider::Model(_) => "llm",
        }
    }
}

impl From<KeywordHeuristic> for DecisionProvider {
    fn from(h: KeywordHeuristic) -> Self {
        DecisionProvider::Heuristic(h)
    }
}

impl From<ModelDecider> for DecisionProvider {
    fn from(m: ModelDecider) -> Self {
        DecisionProvider::Model(m)
    }
}
