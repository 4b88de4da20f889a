//! Simulation-wide constants and defaults
//!
//! Centralizes the market defaults, keyword sets and model prompts so the
//! config layer and the engine agree on one set of numbers.

/// Market defaults
pub mod market {
    /// Opening price of the single traded asset
    pub const INITIAL_PRICE: f64 = 100.0;

    /// Price move per unit of net demand (0.01 = 1% per order)
    pub const PRICE_IMPACT: f64 = 0.01;

    pub const DEFAULT_AGENTS: usize = 10;
    pub const DEFAULT_TICKS: usize = 10;

    /// Headlines drawn (with replacement) once per tick
    pub const NEWS_FEED: [&str; 5] = [
        "Tech sector reports record breaking profits!",
        "Uncertainty looms as inflation hits new highs.",
        "Housing market crash predicted by experts.",
        "New trade deal promises economic growth.",
        "Market remains stable with no major changes.",
    ];
}

/// Trader ledger defaults
pub mod trader {
    pub const INITIAL_CASH: f64 = 1000.0;
    pub const INITIAL_SHARES: u32 = 10;
}

/// Keyword sets for the heuristic decision provider
pub mod keywords {
    pub const BULLISH: [&str; 5] = ["profit", "record", "deal", "growth", "boom"];
    pub const BEARISH: [&str; 5] = ["crash", "loss", "inflation", "disaster", "crisis"];
}

/// Language-model decision provider
pub mod llm {
    pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

    pub const SYSTEM_PROMPT: &str =
        "You are a financial trading bot. Reply with exactly one word: BUY, SELL, or HOLD.";

    /// Per-request timeout; a timed-out request resolves to HOLD
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Retries after the first attempt (0 = single attempt)
    pub const DEFAULT_MAX_RETRIES: u32 = 0;

    /// Exponential backoff base between retries
    pub const RETRY_BASE_DELAY_MS: u64 = 250;

    pub const DEFAULT_MAX_CONCURRENT: usize = 4;
    pub const DEFAULT_QUEUE_SIZE: usize = 64;
}

/// Environment variables read on top of the config file
pub mod env {
    pub const CONFIG_PATH: &str = "MARKET_SIM_CONFIG";
    pub const API_KEY: &str = "OPENAI_API_KEY";
    pub const BASE_URL: &str = "OPENAI_BASE_URL";
    pub const AGENTS: &str = "MARKET_SIM_AGENTS";
    pub const TICKS: &str = "MARKET_SIM_TICKS";
    pub const PROVIDER: &str = "MARKET_SIM_PROVIDER";
    pub const SEED: &str = "MARKET_SIM_SEED";

    pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
}

/// Logging event names for structured logging
pub mod events {
    pub const TICK_STARTED: &str = "tick_started";
    pub const ORDER_FILLED: &str = "order_filled";
    pub const ORDER_SKIPPED: &str = "order_skipped";
    pub const PRICE_UPDATED: &str = "price_updated";
    pub const DECISION_FALLBACK: &str = "decision_fallback";
    pub const DECISION_RETRY: &str = "decision_retry";
    pub const ENVIRONMENT_HALTED: &str = "environment_halted";
}
