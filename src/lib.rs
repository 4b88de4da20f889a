//! LLM Market Sim - agent-based market driven by news headlines
//!
//! Traders read one shared headline per tick, decide BUY/SELL/HOLD through a
//! keyword heuristic or a language model, and the market moves the price in
//! proportion to net demand.

pub mod agents;
pub mod config;
pub mod constants;
pub mod decision;
pub mod error;
pub mod llm;
pub mod market;
pub mod services;

// Re-export commonly used types
pub use agents::TraderAgent;
pub use config::AppConfig;
pub use decision::{Decision, DecisionProvider};
pub use error::{DecisionError, SimError};
pub use market::{MarketEnvironment, MemoryRecorder, Recorder, Snapshot};

#[cfg(test)]
mod decision_tests;
