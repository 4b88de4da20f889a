use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::constants;
use crate::error::SimError;

/// Which decision provider every trader is built with
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Heuristic,
    #[serde(alias = "model", alias = "openai")]
    Llm,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Heuristic => "heuristic",
            ProviderKind::Llm => "llm",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "heuristic" | "keyword" | "mock" => Ok(ProviderKind::Heuristic),
            "llm" | "model" | "openai" => Ok(ProviderKind::Llm),
            other => Err(SimError::Config(format!(
                "unknown decision provider '{}' (expected heuristic|llm)",
                other
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub initial_price: f64,
    pub price_impact: f64,
    pub news_feed: Vec<String>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            initial_price: constants::market::INITIAL_PRICE,
            price_impact: constants::market::PRICE_IMPACT,
            news_feed: constants::market::NEWS_FEED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TraderConfig {
    pub initial_cash: f64,
    pub initial_shares: u32,
}

impl Default for TraderConfig {
    fn default() -> Self {
        Self {
            initial_cash: constants::trader::INITIAL_CASH,
            initial_shares: constants::trader::INITIAL_SHARES,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub provider: ProviderKind,
    pub bullish_keywords: Vec<String>,
    pub bearish_keywords: Vec<String>,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            bullish_keywords: constants::keywords::BULLISH.iter().map(|s| s.to_string()).collect(),
            bearish_keywords: constants::keywords::BEARISH.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub max_concurrent: usize,
    pub queue_size: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: constants::llm::DEFAULT_MODEL.to_string(),
            timeout_secs: constants::llm::DEFAULT_TIMEOUT_SECS,
            max_retries: constants::llm::DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: constants::llm::RETRY_BASE_DELAY_MS,
            max_concurrent: constants::llm::DEFAULT_MAX_CONCURRENT,
            queue_size: constants::llm::DEFAULT_QUEUE_SIZE,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub agents: usize,
    pub ticks: usize,
    /// Fixed RNG seed; `None` seeds from OS entropy
    pub seed: Option<u64>,
    pub chatter_level: String,

    pub market: MarketConfig,
    pub trader: TraderConfig,
    pub decision: DecisionConfig,
    pub llm: LlmConfig,
    pub report: ReportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agents: constants::market::DEFAULT_AGENTS,
            ticks: constants::market::DEFAULT_TICKS,
            seed: None,
            chatter_level: "info".to_string(),
            market: MarketConfig::default(),
            trader: TraderConfig::default(),
            decision: DecisionConfig::default(),
            llm: LlmConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load `config.yaml` (or `$MARKET_SIM_CONFIG`), then apply environment overrides.
    ///
    /// A missing file is not an error: the built-in defaults are used instead.
    pub fn load() -> Result<Self, SimError> {
        let path = std::env::var(constants::env::CONFIG_PATH)
            .unwrap_or_else(|_| constants::env::DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, SimError> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply overrides from an environment lookup (`std::env::var` in production).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), SimError>
    where
        F: Fn(&str) -> Option<String>,
    {
        use constants::env;

        if let Some(key) = lookup(env::API_KEY).filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = lookup(env::BASE_URL).filter(|u| !u.trim().is_empty()) {
            self.llm.base_url = Some(url);
        }
        if let Some(v) = lookup(env::AGENTS) {
            self.agents = parse_var(env::AGENTS, &v)?;
        }
        if let Some(v) = lookup(env::TICKS) {
            self.ticks = parse_var(env::TICKS, &v)?;
        }
        if let Some(v) = lookup(env::SEED) {
            self.seed = Some(parse_var(env::SEED, &v)?);
        }
        if let Some(v) = lookup(env::PROVIDER) {
            self.decision.provider = v.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.agents == 0 {
            return Err("agents must be a positive integer".into());
        }
        let price = self.market.initial_price;
        if price.is_nan() || price <= 0.0 {
            return Err(SimError::Config(format!(
                "market.initial_price must be positive, got {}",
                price
            )));
        }
        check_price_impact(self.agents, self.market.price_impact)?;
        if self.trader.initial_cash < 0.0 {
            return Err(SimError::Config(format!(
                "trader.initial_cash must not be negative, got {}",
                self.trader.initial_cash
            )));
        }
        if self.market.news_feed.is_empty() {
            return Err("market.news_feed must contain at least one headline".into());
        }
        if self.llm.max_concurrent == 0 {
            return Err("llm.max_concurrent must be at least 1".into());
        }
        Ok(())
    }
}

/// The price stays positive only while a tick where every trader sells
/// moves it by less than 100%: `agents * price_impact < 1`.
pub fn check_price_impact(agents: usize, price_impact: f64) -> Result<(), SimError> {
    if !price_impact.is_finite() || price_impact < 0.0 {
        return Err(SimError::Config(format!(
            "market.price_impact must be a finite non-negative number, got {}",
            price_impact
        )));
    }
    if agents as f64 * price_impact >= 1.0 {
        return Err(SimError::Config(format!(
            "{} agents with market.price_impact {} could drive the price to zero (need agents * price_impact < 1)",
            agents, price_impact
        )));
    }
    Ok(())
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T, SimError> {
    value
        .trim()
        .parse()
        .map_err(|_| SimError::Config(format!("invalid value '{}' for {}", value, name)))
}
