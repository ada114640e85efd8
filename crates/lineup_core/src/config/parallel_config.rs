use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Worker-pool usage for season and league sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ParallelConfig {
    /// Fan managers (and long seasons) out over the rayon pool.
    pub enabled: bool,
    /// Seasons go parallel only when their period count exceeds this.
    pub min_periods_for_parallel: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self { enabled: true, min_periods_for_parallel: 16 }
    }
}

impl ParallelConfig {
    pub fn sequential() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    pub fn parallel_periods(&self, period_count: usize) -> bool {
        self.enabled && period_count > self.min_periods_for_parallel
    }
}
