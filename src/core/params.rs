use super::types::STATION_COUNT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Line parameters supplied by the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Batch arrival rate, batches per hour
    pub lambda: f64,
    /// Mean batch size, used by the geometric batch policy
    #[serde(rename = "B")]
    pub batch_mean: f64,
    /// Service rate per station, items per hour
    pub mu: [f64; STATION_COUNT],
    /// Simulated seconds per real second
    pub speed: f64,
    pub seed: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            lambda: 0.022107,
            batch_mean: 133.3333,
            mu: [41.542, 56.82, 56.82, 72.0],
            speed: 500.0,
            seed: 1234,
        }
    }
}

/// Partial update merged into [`Params`]; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsUpdate {
    pub lambda: Option<f64>,
    #[serde(rename = "B")]
    pub batch_mean: Option<f64>,
    pub mu: Option<[f64; STATION_COUNT]>,
    pub speed: Option<f64>,
    pub seed: Option<u32>,
}

impl ParamsUpdate {
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = Some(lambda);
        self
    }

    pub fn with_batch_mean(mut self, batch_mean: f64) -> Self {
        self.batch_mean = Some(batch_mean);
        self
    }

    pub fn with_mu(mut self, mu: [f64; STATION_COUNT]) -> Self {
        self.mu = Some(mu);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("arrival rate must be positive and finite, got {0}")]
    InvalidArrivalRate(f64),
    #[error("mean batch size must be positive and finite, got {0}")]
    InvalidBatchMean(f64),
    #[error("service rate of station {station} must be positive and finite, got {rate}")]
    InvalidServiceRate { station: usize, rate: f64 },
    #[error("speed must be positive and finite, got {0}")]
    InvalidSpeed(f64),
    #[error("unstable line: {load:.3} items/h offered, bottleneck serves {capacity:.3}")]
    Unstable { load: f64, capacity: f64 },
}

fn positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

impl Params {
    /// Return a copy with `update` merged in
    pub fn merged(&self, update: &ParamsUpdate) -> Self {
        Self {
            lambda: update.lambda.unwrap_or(self.lambda),
            batch_mean: update.batch_mean.unwrap_or(self.batch_mean),
            mu: update.mu.unwrap_or(self.mu),
            speed: update.speed.unwrap_or(self.speed),
            seed: update.seed.unwrap_or(self.seed),
        }
    }

    /// Reject values the engine would otherwise clamp at the point of use
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !positive(self.lambda) {
            return Err(ParamsError::InvalidArrivalRate(self.lambda));
        }
        if !positive(self.batch_mean) {
            return Err(ParamsError::InvalidBatchMean(self.batch_mean));
        }
        if let Some((i, &rate)) = self.mu.iter().enumerate().find(|(_, m)| !positive(**m)) {
            return Err(ParamsError::InvalidServiceRate {
                station: i + 1,
                rate,
            });
        }
        if !positive(self.speed) {
            return Err(ParamsError::InvalidSpeed(self.speed));
        }
        if !self.is_stable() {
            return Err(ParamsError::Unstable {
                load: self.offered_load(),
                capacity: self.bottleneck_capacity(),
            });
        }
        Ok(())
    }

    /// Items offered per hour, `lambda * B`
    pub fn offered_load(&self) -> f64 {
        self.lambda * self.batch_mean
    }

    /// Service rate of the slowest station
    pub fn bottleneck_capacity(&self) -> f64 {
        self.mu.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Offered load as a fraction of the bottleneck capacity
    pub fn bottleneck_utilization(&self) -> f64 {
        self.offered_load() / self.bottleneck_capacity()
    }

    /// Whether the slowest station keeps up with the offered load
    pub fn is_stable(&self) -> bool {
        self.offered_load() < self.bottleneck_capacity()
    }
}
