use super::types::{Job, SimTime, STATION_COUNT};
use super::work_calendar::WorkStatus;
use serde::Serialize;

/// Read-only view of one station and its queue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationView {
    pub queue_length: usize,
    pub busy: bool,
    pub job: Option<Job>,
    pub service_rate: f64,
    pub utilization: f64,
    /// Mean hours waited in this station's queue by jobs it has served
    pub avg_queue_time: f64,
    pub avg_service_time: f64,
    pub completed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemMetrics {
    pub total_queue_length: usize,
    /// Mean hours from first queue entry to leaving the last station
    pub avg_system_time: f64,
    pub jobs_entered: u64,
    pub departures: u64,
}

/// Immutable projection of the engine at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSnapshot {
    pub t: SimTime,
    pub clock: String,
    pub work_status: WorkStatus,
    pub stations: [StationView; STATION_COUNT],
    /// Departures per simulated hour since t = 0
    pub throughput: f64,
    pub system: SystemMetrics,
    pub next_arrival_time: Option<SimTime>,
}

impl SystemSnapshot {
    pub fn queue_lengths(&self) -> [usize; STATION_COUNT] {
        std::array::from_fn(|i| self.stations[i].queue_length)
    }

    pub fn utilizations(&self) -> [f64; STATION_COUNT] {
        std::array::from_fn(|i| self.stations[i].utilization)
    }
}

impl std::fmt::Display for SystemSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "t={:.2}h  {}  [{}]  throughput={:.2}/h  out={}",
            self.t, self.clock, self.work_status, self.throughput, self.system.departures
        )?;
        for (i, station) in self.stations.iter().enumerate() {
            writeln!(
                f,
                "  S{}: queue={:<6} {:<4} util={:>5.1}%  wait={:.3}h  service={:.4}h",
                i + 1,
                station.queue_length,
                if station.busy { "BUSY" } else { "idle" },
                station.utilization * 100.0,
                station.avg_queue_time,
                station.avg_service_time
            )?;
        }
        let next = self
            .next_arrival_time
            .map(|t| format!("{:.2}h", t))
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "  queued={}  avg sojourn={:.2}h  next batch at {}",
            self.system.total_queue_length, self.system.avg_system_time, next
        )
    }
}
