use futures_util::future::join_all;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, error, info};

use crate::agents::TraderAgent;
use crate::config::{check_price_impact, AppConfig};
use crate::constants::events;
use crate::decision::DecisionProvider;
use crate::error::SimError;

use super::recorder::{AgentSnapshot, MemoryRecorder, Recorder, Snapshot};
use super::state::{EnvState, MarketState};

/// Multiplicative price rule: each unit of net demand moves the price by `impact`.
pub fn next_price(price: f64, net_demand: i64, impact: f64) -> f64 {
    price * (1.0 + net_demand as f64 * impact)
}

/// Owns the market state, the traders and the recorder, and advances them one tick at a time.
pub struct MarketEnvironment<R: Recorder = MemoryRecorder> {
    state: MarketState,
    status: EnvState,
    agents: Vec<TraderAgent>,
    news_feed: Vec<String>,
    price_impact: f64,
    rng: StdRng,
    recorder: R,
}

impl MarketEnvironment<MemoryRecorder> {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_recorder(config, MemoryRecorder::new())
    }
}

impl<R: Recorder> MarketEnvironment<R> {
    /// Build traders from config. If the decision provider cannot be
    /// initialized the environment starts halted, with no traders.
    pub fn with_recorder(config: &AppConfig, recorder: R) -> Self {
        match Self::build_agents(config) {
            Ok(agents) => {
                info!(
                    "🏦 [MARKET] Created {} traders (provider: {}, price: {:.2})",
                    agents.len(),
                    config.decision.provider.as_str(),
                    config.market.initial_price
                );
                Self::from_agents(config, agents, recorder)
            }
            Err(e) => Self::halted(config, recorder, e.to_string()),
        }
    }

    /// Running environment over a caller-supplied set of traders.
    ///
    /// Halts instead if the population is large enough for one tick of
    /// all-sell orders to push the price to zero.
    pub fn from_agents(config: &AppConfig, agents: Vec<TraderAgent>, recorder: R) -> Self {
        if let Err(e) = check_price_impact(agents.len(), config.market.price_impact) {
            return Self::halted(config, recorder, e.to_string());
        }
        Self::assemble(config, agents, recorder, EnvState::Running)
    }

    pub fn halted(config: &AppConfig, recorder: R, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        error!(
            event = events::ENVIRONMENT_HALTED,
            "🛑 [MARKET] Environment halted: {}", reason
        );

        Self::assemble(config, Vec::new(), recorder, EnvState::Halted { reason })
    }

    fn assemble(config: &AppConfig, agents: Vec<TraderAgent>, recorder: R, status: EnvState) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            state: MarketState::new(config.market.initial_price),
            status,
            agents,
            news_feed: config.market.news_feed.clone(),
            price_impact: config.market.price_impact,
            rng,
            recorder,
        }
    }

    fn build_agents(config: &AppConfig) -> Result<Vec<TraderAgent>, SimError> {
        config.validate()?;
        let provider = DecisionProvider::from_config(config)?;

        Ok((0..config.agents)
            .map(|id| {
                TraderAgent::new(
                    id,
                    config.trader.initial_cash,
                    config.trader.initial_shares,
                    provider.clone(),
                )
            })
            .collect())
    }

    /// Advance the market by one tick and return the snapshot it recorded.
    ///
    /// Every decision for the tick is resolved before any trade is applied,
    /// and every trade is applied before the price moves. On a halted
    /// environment this does nothing and returns `None`.
    pub async fn tick(&mut self) -> Option<&Snapshot> {
        if let EnvState::Halted { reason } = &self.status {
            debug!("🛑 [MARKET] Tick skipped, environment halted: {}", reason);
            return None;
        }

        self.state.reset_orders();
        self.state.news = self.news_feed.choose(&mut self.rng).cloned().unwrap_or_default();

        debug!(
            event = events::TICK_STARTED,
            "📰 [MARKET] Tick {} news: {}", self.state.tick, self.state.news
        );

        let mut order: Vec<usize> = (0..self.agents.len()).collect();
        order.shuffle(&mut self.rng);

        let decisions = {
            let news = self.state.news.as_str();
            let agents = &self.agents;
            join_all(order.iter().map(|&idx| agents[idx].decide(news))).await
        };

        for (&idx, decision) in order.iter().zip(decisions) {
            self.agents[idx].execute(decision, &mut self.state);
        }

        let previous = self.state.price;
        self.state.price = next_price(previous, self.state.net_demand(), self.price_impact);

        info!(
            event = events::PRICE_UPDATED,
            "📈 [MARKET] Tick {}: {:.2} -> {:.2} (buys={}, sells={})",
            self.state.tick,
            previous,
            self.state.price,
            self.state.buy_orders,
            self.state.sell_orders
        );

        let snapshot = self.snapshot();
        self.state.tick += 1;
        self.recorder.record(snapshot);
        self.recorder.latest()
    }

    /// Run up to `ticks` ticks; returns how many actually executed.
    pub async fn run(&mut self, ticks: usize) -> usize {
        let mut executed = 0;
        for _ in 0..ticks {
            if self.tick().await.is_none() {
                break;
            }
            executed += 1;
        }
        executed
    }

    fn snapshot(&self) -> Snapshot {
        let price = self.state.price;
        Snapshot {
            tick: self.state.tick,
            price,
            news: self.state.news.clone(),
            buy_orders: self.state.buy_orders,
            sell_orders: self.state.sell_orders,
            agents: self
                .agents
                .iter()
                .map(|a| AgentSnapshot {
                    agent_id: a.id(),
                    cash: a.cash(),
                    shares: a.shares(),
                    wealth: a.wealth(price),
                })
                .collect(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == EnvState::Running
    }

    pub fn status(&self) -> &EnvState {
        &self.status
    }

    pub fn halt_reason(&self) -> Option<&str> {
        match &self.status {
            EnvState::Halted { reason } => Some(reason),
            EnvState::Running => None,
        }
    }

    pub fn state(&self) -> &MarketState {
        &self.state
    }

    pub fn price(&self) -> f64 {
        self.state.price
    }

    pub fn agents(&self) -> &[TraderAgent] {
        &self.agents
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn into_recorder(self) -> R {
        self.recorder
    }
}
