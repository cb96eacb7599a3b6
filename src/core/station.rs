use super::queue::JobQueue;
use super::rng::{exponential, XorShift32};
use super::types::{Job, SimTime, StationId};
use log::debug;

/// Denominator floor for utilization at t = 0
const MIN_ELAPSED: f64 = 1e-9;

/// Single-capacity server.
///
/// Busy time is folded into `busy_time_acc` only when a service ends;
/// `utilization` adds the open busy period on the fly.
#[derive(Debug, Clone)]
pub struct Station {
    id: StationId,
    mu: f64,
    current: Option<Job>,
    busy_time_acc: f64,
    last_update_t: SimTime,
}

impl Station {
    pub fn new(id: StationId, mu: f64) -> Self {
        Self {
            id,
            mu,
            current: None,
            busy_time_acc: 0.0,
            last_update_t: 0.0,
        }
    }

    pub fn id(&self) -> StationId {
        self.id
    }

    /// Service rate in items per hour
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Change the service rate; applies from the next sampled service
    pub fn set_mu(&mut self, mu: f64) {
        self.mu = mu;
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Job> {
        self.current.as_ref()
    }

    pub fn busy_time(&self) -> f64 {
        self.busy_time_acc
    }

    /// Start serving the head of `queue` if idle.
    ///
    /// Returns the completion time of the new service. The caller is
    /// responsible for the work-calendar gate.
    pub fn maybe_start(
        &mut self,
        t: SimTime,
        queue: &mut JobQueue,
        rng: &mut XorShift32,
    ) -> Option<SimTime> {
        if self.is_busy() {
            return None;
        }
        let mut job = queue.pop()?;
        let service = exponential(rng, self.mu);
        job.service_start_time = Some(t);
        job.service_time = Some(service);
        debug!(
            "{} starts job {} at t={:.4}h for {:.4}h",
            self.id, job.id, t, service
        );
        self.current = Some(job);
        self.last_update_t = t;
        Some(t + service)
    }

    /// End the current service at `t` and hand back the finished job
    pub fn finish(&mut self, t: SimTime) -> Option<Job> {
        let job = self.current.take()?;
        self.busy_time_acc += t - self.last_update_t;
        self.last_update_t = t;
        Some(job)
    }

    /// Fraction of `[0, t]` spent busy, clamped to at most 1
    pub fn utilization(&self, t: SimTime) -> f64 {
        let extra = if self.is_busy() {
            t - self.last_update_t
        } else {
            0.0
        };
        ((self.busy_time_acc + extra) / t.max(MIN_ELAPSED)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> Station {
        Station::new(StationId::new(0).unwrap(), 10.0)
    }

    #[test]
    fn test_idle_with_empty_queue() {
        let mut s = station();
        let mut rng = XorShift32::new(1);
        let mut queue = JobQueue::new();
        assert_eq!(s.maybe_start(1.0, &mut queue, &mut rng), None);
        assert!(!s.is_busy());
        assert_eq!(s.finish(2.0), None);
    }

    #[test]
    fn test_start_and_finish() {
        let mut s = station();
        let mut rng = XorShift32::new(1);
        let mut queue = JobQueue::new();
        queue.push(Job::new(1, 1, 0.0));
        queue.push(Job::new(2, 1, 0.0));

        let done_at = s.maybe_start(1.0, &mut queue, &mut rng).unwrap();
        assert!(done_at >= 1.0);
        assert!(s.is_busy());
        assert_eq!(queue.len(), 1);
        let current = s.current().unwrap();
        assert_eq!(current.id, 1);
        assert_eq!(current.service_start_time, Some(1.0));
        assert_eq!(current.service_time, Some(done_at - 1.0));

        // Busy stations do not take another job
        assert_eq!(s.maybe_start(1.5, &mut queue, &mut rng), None);

        let job = s.finish(done_at).unwrap();
        assert_eq!(job.id, 1);
        assert!(!s.is_busy());
        assert!((s.busy_time() - (done_at - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_utilization_counts_open_period() {
        let mut s = station();
        let mut rng = XorShift32::new(3);
        let mut queue = JobQueue::new();
        queue.push(Job::new(1, 1, 0.0));
        assert_eq!(s.utilization(0.0), 0.0);

        s.maybe_start(2.0, &mut queue, &mut rng);
        // One open busy hour out of three elapsed
        let u = s.utilization(3.0);
        assert!((u - 1.0 / 3.0).abs() < 1e-12);
        assert!(u <= 1.0);
    }

    #[test]
    fn test_set_mu_keeps_running_service() {
        let mut s = station();
        let mut rng = XorShift32::new(9);
        let mut queue = JobQueue::new();
        queue.push(Job::new(1, 1, 0.0));
        let done_at = s.maybe_start(0.0, &mut queue, &mut rng).unwrap();
        s.set_mu(1000.0);
        assert_eq!(s.mu(), 1000.0);
        assert_eq!(s.current().and_then(|j| j.service_time), Some(done_at));
    }
}
