use super::rng::{geometric_batch_size, XorShift32};
use serde::{Deserialize, Serialize};

/// Batch sizes cycled through by default
pub const DEFAULT_BATCH_CYCLE: [u32; 3] = [200, 150, 50];

/// How the size of each arriving batch is chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSizePolicy {
    /// Repeat a fixed list of sizes in order
    Cycle(Vec<u32>),
    /// Geometric sizes with mean equal to the `B` parameter
    Geometric,
}

impl Default for BatchSizePolicy {
    fn default() -> Self {
        BatchSizePolicy::Cycle(DEFAULT_BATCH_CYCLE.to_vec())
    }
}

/// Stateful batch-size source driven by a [`BatchSizePolicy`]
#[derive(Debug, Clone)]
pub struct BatchSizer {
    policy: BatchSizePolicy,
    cursor: usize,
}

impl BatchSizer {
    pub fn new(policy: BatchSizePolicy) -> Self {
        Self { policy, cursor: 0 }
    }

    pub fn policy(&self) -> &BatchSizePolicy {
        &self.policy
    }

    /// Produce the next batch size. Only the geometric policy draws from `rng`.
    pub fn next_size(&mut self, rng: &mut XorShift32, mean: f64) -> u32 {
        match &self.policy {
            BatchSizePolicy::Cycle(sizes) if !sizes.is_empty() => {
                let size = sizes[self.cursor % sizes.len()];
                self.cursor = (self.cursor + 1) % sizes.len();
                size
            }
            BatchSizePolicy::Cycle(_) => 0,
            BatchSizePolicy::Geometric => geometric_batch_size(rng, mean),
        }
    }
}

impl Default for BatchSizer {
    fn default() -> Self {
        Self::new(BatchSizePolicy::default())
    }
}
