//! The market environment: one price, one headline, a fixed set of traders.

pub mod environment;
pub mod recorder;
pub mod state;

pub use environment::{next_price, MarketEnvironment};
pub use recorder::{AgentRow, AgentSnapshot, MemoryRecorder, ModelRow, Recorder, Snapshot};
pub use state::{EnvState, MarketState};
