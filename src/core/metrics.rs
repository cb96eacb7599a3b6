use super::types::{Job, SimTime, STATION_COUNT};

/// Running sums for one station
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StationMetrics {
    pub queue_time_sum: f64,
    pub service_time_sum: f64,
    pub completed: u64,
}

impl StationMetrics {
    /// Fold a job that just finished service at this station
    pub fn record(&mut self, job: &Job) {
        if let Some(wait) = job.queue_wait() {
            self.queue_time_sum += wait;
        }
        if let Some(service) = job.service_time {
            self.service_time_sum += service;
            self.completed += 1;
        }
    }

    pub fn avg_queue_time(&self) -> f64 {
        mean(self.queue_time_sum, self.completed)
    }

    pub fn avg_service_time(&self) -> f64 {
        mean(self.service_time_sum, self.completed)
    }
}

/// Line-wide accumulators, reset only with the engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineMetrics {
    pub stations: [StationMetrics; STATION_COUNT],
    pub sojourn_time_sum: f64,
    pub departures: u64,
}

impl LineMetrics {
    /// Fold a job leaving the last station at `t`
    pub fn record_exit(&mut self, job: &Job, t: SimTime) {
        self.sojourn_time_sum += t - job.enter_time;
        self.departures += 1;
    }

    pub fn avg_sojourn_time(&self) -> f64 {
        mean(self.sojourn_time_sum, self.departures)
    }
}

fn mean(sum: f64, count: u64) -> f64 {
    if count > 0 {
        sum / count as f64
    } else {
        0.0
    }
}
