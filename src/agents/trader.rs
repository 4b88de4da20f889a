use tracing::debug;

use crate::constants::events;
use crate::decision::{Decision, DecisionProvider};
use crate::market::MarketState;

/// A trader with a private ledger and its own decision provider.
///
/// Cash never goes negative and shares are unsigned: a BUY without enough
/// cash or a SELL with nothing to sell is a silent no-op.
#[derive(Clone, Debug)]
pub struct TraderAgent {
    id: usize,
    cash: f64,
    shares: u32,
    provider: DecisionProvider,
}

impl TraderAgent {
    pub fn new(id: usize, cash: f64, shares: u32, provider: DecisionProvider) -> Self {
        Self {
            id,
            cash: cash.max(0.0),
            shares,
            provider,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn shares(&self) -> u32 {
        self.shares
    }

    pub fn provider(&self) -> &DecisionProvider {
        &self.provider
    }

    /// Mark-to-market value at `price`
    pub fn wealth(&self, price: f64) -> f64 {
        self.cash + f64::from(self.shares) * price
    }

    /// Read the current headline and decide; touches no state.
    pub async fn decide(&self, news: &str) -> Decision {
        self.provider.decide(news).await
    }

    /// Apply `decision` at the market's current price.
    ///
    /// Returns `true` when an order was filled and counted on the market.
    pub fn execute(&mut self, decision: Decision, market: &mut MarketState) -> bool {
        let price = market.price;
        match decision {
            Decision::Buy if self.cash >= price => {
                self.cash -= price;
                self.shares += 1;
                market.buy_orders += 1;
            }
            Decision::Sell if self.shares > 0 => {
                self.cash += price;
                self.shares -= 1;
                market.sell_orders += 1;
            }
            Decision::Hold => return false,
            rejected => {
                debug!(
                    event = events::ORDER_SKIPPED,
                    "⏸️ [TRADER {}] {} skipped (cash={:.2}, shares={}, price={:.2})",
                    self.id, rejected, self.cash, self.shares, price
                );
                return false;
            }
        }

        debug!(
            event = events::ORDER_FILLED,
            "✅ [TRADER {}] {} @ {:.2} (cash={:.2}, shares={})",
            self.id, decision, price, self.cash, self.shares
        );
        true
    }

    /// One activation: read the news, decide, then trade.
    pub async fn act(&mut self, market: &mut MarketState) -> bool {
        let decision = self.decide(&market.news).await;
        self.execute(decision, market)
    }
}
