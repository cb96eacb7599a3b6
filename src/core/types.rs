use serde::{Deserialize, Serialize};

/// Number of stations on the line
pub const STATION_COUNT: usize = 4;

/// Simulated time in hours since Monday 00:00
pub type SimTime = f64;

/// Station identifier, stored as a 0-based index and displayed 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StationId(usize);

impl StationId {
    /// Create a station id from a 0-based index, `None` when out of range
    pub fn new(index: usize) -> Option<Self> {
        (index < STATION_COUNT).then_some(Self(index))
    }

    /// Get the 0-based index
    pub fn index(&self) -> usize {
        self.0
    }

    /// Get the 1-based station number used in reports
    pub fn number(&self) -> usize {
        self.0 + 1
    }

    /// The station fed by this one, `None` for the last station
    pub fn next(&self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    /// Whether jobs leave the system after this station
    pub fn is_last(&self) -> bool {
        self.0 + 1 == STATION_COUNT
    }

    /// All stations in line order
    pub fn all() -> impl Iterator<Item = StationId> {
        (0..STATION_COUNT).map(StationId)
    }
}

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{}", self.number())
    }
}

/// Every station in line order
pub const STATIONS: [StationId; STATION_COUNT] =
    [StationId(0), StationId(1), StationId(2), StationId(3)];

pub type BatchId = u64;
pub type JobId = u64;

/// A cohort of work items arriving together at the first station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    pub size: u32,
    pub arrival_time: SimTime,
}

/// One work item flowing through every station in order.
///
/// The queue and service timestamps describe the station the job is
/// currently at; they are overwritten on every hand-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub batch_id: BatchId,
    pub enter_time: SimTime,
    pub queue_start_time: Option<SimTime>,
    pub service_start_time: Option<SimTime>,
    pub service_time: Option<SimTime>,
}

impl Job {
    /// Create a job entering the first queue at `t`
    pub fn new(id: JobId, batch_id: BatchId, t: SimTime) -> Self {
        Self {
            id,
            batch_id,
            enter_time: t,
            queue_start_time: Some(t),
            service_start_time: None,
            service_time: None,
        }
    }

    /// Time spent waiting in the current station's queue, once service started
    pub fn queue_wait(&self) -> Option<SimTime> {
        match (self.queue_start_time, self.service_start_time) {
            (Some(queued), Some(started)) => Some(started - queued),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_id_bounds() {
        assert!(StationId::new(3).is_some());
        assert!(StationId::new(4).is_none());
        assert_eq!(StationId::all().count(), STATION_COUNT);
    }

    #[test]
    fn test_station_id_chain() {
        let first = StationId::new(0).unwrap();
        assert_eq!(first.number(), 1);
        assert_eq!(first.to_string(), "S1");
        let last = StationId::new(3).unwrap();
        assert!(last.is_last());
        assert_eq!(last.next(), None);
        assert_eq!(first.next().map(|s| s.index()), Some(1));
    }

    #[test]
    fn test_job_queue_wait() {
        let mut job = Job::new(1, 1, 2.0);
        assert_eq!(job.queue_wait(), None);
        job.service_start_time = Some(2.5);
        assert_eq!(job.queue_wait(), Some(0.5));
    }
}
