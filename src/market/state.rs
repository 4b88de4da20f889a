use serde::Serialize;

/// Shared market state read and written by traders during a tick
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarketState {
    pub price: f64,
    pub news: String,
    pub buy_orders: u32,
    pub sell_orders: u32,
    /// Completed ticks
    pub tick: u64,
}

impl MarketState {
    pub fn new(initial_price: f64) -> Self {
        Self {
            price: initial_price,
            news: String::new(),
            buy_orders: 0,
            sell_orders: 0,
            tick: 0,
        }
    }

    pub fn net_demand(&self) -> i64 {
        i64::from(self.buy_orders) - i64::from(self.sell_orders)
    }

    pub fn reset_orders(&mut self) {
        self.buy_orders = 0;
        self.sell_orders = 0;
    }
}

/// Lifecycle of an environment. `Halted` is terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvState {
    Running,
    Halted { reason: String },
}
