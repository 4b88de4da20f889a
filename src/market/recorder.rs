use serde::Serialize;

/// Per-agent values sampled at the end of a tick
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentSnapshot {
    pub agent_id: usize,
    pub cash: f64,
    pub shares: u32,
    pub wealth: f64,
}

/// One recorder entry, emitted once per completed tick
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub price: f64,
    pub news: String,
    pub buy_orders: u32,
    pub sell_orders: u32,
    pub agents: Vec<AgentSnapshot>,
}

/// Model-level view of a snapshot
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelRow {
    pub tick: u64,
    pub price: f64,
    pub news: String,
    pub buys: u32,
    pub sells: u32,
}

/// Agent-level view: one row per agent per tick
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentRow {
    pub tick: u64,
    pub agent_id: usize,
    pub wealth: f64,
}

/// Append-only sink for tick snapshots
pub trait Recorder {
    fn record(&mut self, snapshot: Snapshot);
    fn latest(&self) -> Option<&Snapshot>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryRecorder {
    snapshots: Vec<Snapshot>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn model_rows(&self) -> Vec<ModelRow> {
        self.snapshots
            .iter()
            .map(|s| ModelRow {
                tick: s.tick,
                price: s.price,
                news: s.news.clone(),
                buys: s.buy_orders,
                sells: s.sell_orders,
            })
            .collect()
    }

    pub fn agent_rows(&self) -> Vec<AgentRow> {
        self.snapshots
            .iter()
            .flat_map(|s| {
                s.agents.iter().map(move |a| AgentRow {
                    tick: s.tick,
                    agent_id: a.agent_id,
                    wealth: a.wealth,
                })
            })
            .collect()
    }
}

impl Recorder for MemoryRecorder {
    fn record(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    fn len(&self) -> usize {
        self.snapshots.len()
    }
}
