//! Error types for the market simulation
//!
//! `SimError` covers everything that can stop a run from starting.
//! `DecisionError` stays inside the decision layer: `DecisionProvider::decide`
//! maps every variant to HOLD, so it never reaches an agent.

use thiserror::Error;

/// Errors raised while configuring or constructing a simulation
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential for {provider} decision provider")]
    MissingCredential { provider: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failures of a single model-backed decision request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecisionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Model returned an empty reply")]
    EmptyReply,

    #[error("LLM queue closed")]
    QueueClosed,
}

impl DecisionError {
    /// Worth another attempt: the same request may succeed if sent again.
    pub fn is_transient(&self) -> bool {
        matches!(self, DecisionError::Transport(_) | DecisionError::Timeout { .. })
    }
}

impl From<String> for SimError {
    fn from(err: String) -> Self {
        SimError::Config(err)
    }
}

impl From<&str> for SimError {
    fn from(err: &str) -> Self {
        SimError::Config(err.to_string())
    }
}

impl From<async_openai::error::OpenAIError> for DecisionError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        DecisionError::Transport(err.to_string())
    }
}
