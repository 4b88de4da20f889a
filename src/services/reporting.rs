use serde::Serialize;

use crate::market::Snapshot;

pub const SEPARATOR_WIDTH: usize = 85;

pub fn table_header() -> String {
    format!(
        "{:<5} | {:<10} | {:<15} | {}",
        "Step", "Price ($)", "Orders (B/S)", "News Headline"
    )
}

/// Printed instead of the table when the environment never started
pub fn halted_message(reason: &str) -> String {
    format!("Simulation stopped: environment halted ({}).", reason)
}

pub fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

/// One table row: step, price to two decimals, buys / sells, headline
pub fn format_row(snapshot: &Snapshot) -> String {
    let price = format!("{:.2}", snapshot.price);
    let orders = format!("{} / {}", snapshot.buy_orders, snapshot.sell_orders);
    format!(
        "{:<5} | {:<10} | {:<15} | {}",
        snapshot.tick, price, orders, snapshot.news
    )
}

/// Snapshot as a single JSON line (per-agent values included)
pub fn format_json(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub ticks: usize,
    pub start_price: f64,
    pub end_price: f64,
    pub price_change_pct: f64,
    pub total_buys: u64,
    pub total_sells: u64,

    /// (agent id, wealth) of the richest trader after the last tick
    pub richest_agent: Option<(usize, f64)>,
}

impl RunSummary {
    /// Summarize a run from its recorded snapshots.
    ///
    /// `start_price` is the price before the first tick; the snapshots only
    /// carry post-update prices.
    pub fn from_snapshots(start_price: f64, snapshots: &[Snapshot]) -> Self {
        let Some(last) = snapshots.last() else {
            return Self {
                start_price,
                end_price: start_price,
                ..Self::default()
            };
        };

        let price_change_pct = if start_price > 0.0 {
            (last.price - start_price) / start_price * 100.0
        } else {
            0.0
        };

        let richest_agent = last
            .agents
            .iter()
            .max_by(|a, b| a.wealth.total_cmp(&b.wealth))
            .map(|a| (a.agent_id, a.wealth));

        Self {
            ticks: snapshots.len(),
            start_price,
            end_price: last.price,
            price_change_pct,
            total_buys: snapshots.iter().map(|s| u64::from(s.buy_orders)).sum(),
            total_sells: snapshots.iter().map(|s| u64::from(s.sell_orders)).sum(),
            richest_agent,
        }
    }

    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("Ticks run:      {}", self.ticks),
            format!(
                "Price:          {:.2} -> {:.2} ({:+.2}%)",
                self.start_price, self.end_price, self.price_change_pct
            ),
            format!("Orders (B/S):   {} / {}", self.total_buys, self.total_sells),
        ];
        if let Some((id, wealth)) = self.richest_agent {
            lines.push(format!("Richest trader: #{} ({:.2})", id, wealth));
        }
        lines.join("\n")
    }
}
