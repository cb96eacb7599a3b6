use super::batching::{BatchSizePolicy, BatchSizer};
use super::event_calendar::{EventCalendar, EventKind, ScheduledEvent};
use super::metrics::LineMetrics;
use super::params::{Params, ParamsError, ParamsUpdate};
use super::queue::JobQueue;
use super::rng::{exponential, XorShift32};
use super::snapshot::{StationView, SystemMetrics, SystemSnapshot};
use super::station::Station;
use super::types::{Batch, BatchId, Job, JobId, SimTime, StationId, STATIONS, STATION_COUNT};
use super::work_calendar;
use log::{debug, info, trace, warn};

/// Denominator floor for rates at t = 0
const MIN_ELAPSED: f64 = 1e-9;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Observer trait for simulation events.
///
/// All hooks default to no-ops; implement the ones you need.
pub trait SimulationObserver {
    /// Called when simulated time moves forward
    fn on_time_advance(&mut self, _old_t: SimTime, _new_t: SimTime) {}

    /// Called when a batch is expanded into the first queue
    fn on_arrival(&mut self, _batch: &Batch) {}

    /// Called when a station takes a job from its queue
    fn on_service_start(&mut self, _station: StationId, _job: &Job, _t: SimTime) {}

    /// Called when a station finishes a job, before the hand-off
    fn on_departure(&mut self, _station: StationId, _job: &Job, _t: SimTime) {}

    /// Called when a job leaves the last station
    fn on_exit(&mut self, _job: &Job, _t: SimTime) {}

    /// Called when a `step` or `run_until` call returns
    fn on_step_complete(&mut self, _t: SimTime, _events_processed: usize) {}
}

/// A station and the queue in front of it
#[derive(Debug, Clone)]
struct ServiceLine {
    station: Station,
    queue: JobQueue,
}

/// Discrete-event model of the four-station tandem line.
///
/// Owns the event calendar, the station/queue pairs and every accumulator.
/// Single-threaded; all mutation goes through `step`, `set_params` and `reset`.
pub struct SimulationEngine {
    params: Params,
    rng: XorShift32,
    now: SimTime,
    next_batch_id: BatchId,
    next_job_id: JobId,
    batch_sizer: BatchSizer,
    lines: [ServiceLine; STATION_COUNT],
    calendar: EventCalendar,
    metrics: LineMetrics,
    jobs_entered: u64,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl SimulationEngine {
    /// Create an engine with the first batch due at t = 0.
    ///
    /// Out-of-range parameters are not rejected; they are clamped where used.
    pub fn new(params: Params) -> Self {
        Self::with_batch_policy(params, BatchSizePolicy::default())
    }

    /// Validate `params` and create an engine
    pub fn try_new(params: Params) -> Result<Self, ParamsError> {
        params.validate()?;
        Ok(Self::new(params))
    }

    pub fn with_batch_policy(params: Params, policy: BatchSizePolicy) -> Self {
        let lines = std::array::from_fn(|i| ServiceLine {
            station: Station::new(STATIONS[i], params.mu[i]),
            queue: JobQueue::new(),
        });
        let mut engine = Self {
            rng: XorShift32::new(params.seed),
            params,
            now: 0.0,
            next_batch_id: 1,
            next_job_id: 1,
            batch_sizer: BatchSizer::new(policy),
            lines,
            calendar: EventCalendar::new(),
            metrics: LineMetrics::default(),
            jobs_entered: 0,
            observers: Vec::new(),
        };
        engine.schedule_arrival(0.0);
        info!(
            "Engine ready: lambda={} mu={:?} speed={} seed={}",
            engine.params.lambda, engine.params.mu, engine.params.speed, engine.params.seed
        );
        engine
    }

    /// Add an observer; observers are kept across `reset`
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    /// Merge a partial update into the parameters.
    ///
    /// Service rates reach the stations immediately and apply from the next
    /// sampled service. A new seed only takes effect on `reset`.
    pub fn set_params(&mut self, update: &ParamsUpdate) {
        self.apply_params(self.params.merged(update));
    }

    /// Like `set_params`, but rejects the merged result if it is invalid
    pub fn try_set_params(&mut self, update: &ParamsUpdate) -> Result<(), ParamsError> {
        let merged = self.params.merged(update);
        merged.validate()?;
        self.apply_params(merged);
        Ok(())
    }

    fn apply_params(&mut self, params: Params) {
        for (line, &mu) in self.lines.iter_mut().zip(params.mu.iter()) {
            line.station.set_mu(mu);
        }
        debug!("Parameters updated: {:?}", params);
        self.params = params;
    }

    /// Rebuild the engine from the current parameters with a fresh RNG stream
    pub fn reset(&mut self) {
        let fresh = Self::with_batch_policy(self.params.clone(), self.batch_sizer.policy().clone());
        let observers = std::mem::take(&mut self.observers);
        *self = fresh;
        self.observers = observers;
        info!("Engine reset");
    }

    /// Advance by `delta_real_seconds` of wall-clock time scaled by `speed`
    pub fn step(&mut self, delta_real_seconds: f64) {
        let hours = delta_real_seconds * self.params.speed / SECONDS_PER_HOUR;
        self.advance_by_hours(hours);
    }

    /// Advance by a number of simulated hours; negative or non-finite counts as zero
    pub fn advance_by_hours(&mut self, hours: f64) {
        let hours = if hours.is_finite() { hours.max(0.0) } else { 0.0 };
        self.run_until(self.now + hours);
    }

    /// Process every event due at or before `horizon`, then move time to it
    pub fn run_until(&mut self, horizon: SimTime) {
        if horizon == f64::INFINITY {
            warn!("Refusing to run to an infinite horizon");
            return;
        }
        let horizon = horizon.max(self.now);
        let mut events_processed = 0;

        loop {
            // Work resuming is not an event, but it can unblock stations
            let resume_at = work_calendar::next_work_start(self.now);
            let resume_first = self.calendar.peek_time().map_or(true, |t| resume_at <= t);
            if resume_at <= horizon && resume_first {
                self.advance_clock(resume_at);
                trace!("Work resumes at t={:.4}h", resume_at);
                self.try_start_all();
                continue;
            }

            match self.calendar.pop_due(horizon) {
                Some(event) => {
                    self.advance_clock(event.time);
                    self.process_event(event);
                    events_processed += 1;
                }
                None => {
                    self.advance_clock(horizon);
                    break;
                }
            }
        }

        for observer in &mut self.observers {
            observer.on_step_complete(self.now, events_processed);
        }
    }

    fn advance_clock(&mut self, t: SimTime) {
        if t <= self.now {
            return;
        }
        let old_t = self.now;
        self.now = t;
        for observer in &mut self.observers {
            observer.on_time_advance(old_t, t);
        }
    }

    fn process_event(&mut self, event: ScheduledEvent) {
        debug!("=== t={:.4}h {:?} ===", event.time, event.kind);
        match event.kind {
            EventKind::Arrival(batch) => self.handle_arrival(batch),
            EventKind::Departure(station) => self.handle_departure(station),
        }
    }

    fn schedule_arrival(&mut self, at: SimTime) {
        let size = self.batch_sizer.next_size(&mut self.rng, self.params.batch_mean);
        let batch = Batch {
            id: self.next_batch_id,
            size,
            arrival_time: at,
        };
        self.next_batch_id += 1;
        debug!("Batch {} of {} scheduled at t={:.4}h", batch.id, size, at);
        self.calendar.schedule(at, EventKind::Arrival(batch));
    }

    fn handle_arrival(&mut self, batch: Batch) {
        info!(
            "Batch {} arrives with {} items at t={:.4}h",
            batch.id, batch.size, self.now
        );
        let first = &mut self.lines[0].queue;
        for _ in 0..batch.size {
            first.push(Job::new(self.next_job_id, batch.id, self.now));
            self.next_job_id += 1;
        }
        self.jobs_entered += batch.size as u64;
        for observer in &mut self.observers {
            observer.on_arrival(&batch);
        }

        let gap = exponential(&mut self.rng, self.params.lambda);
        self.schedule_arrival(self.now + gap);
        self.try_start_all();
    }

    fn handle_departure(&mut self, station: StationId) {
        let now = self.now;
        let Some(mut job) = self.lines[station.index()].station.finish(now) else {
            warn!("{} departure at t={:.4}h with no job in service", station, now);
            return;
        };
        self.metrics.stations[station.index()].record(&job);
        for observer in &mut self.observers {
            observer.on_departure(station, &job, now);
        }

        match station.next() {
            Some(next) => {
                job.queue_start_time = Some(now);
                self.lines[next.index()].queue.push(job);
            }
            None => {
                self.metrics.record_exit(&job, now);
                for observer in &mut self.observers {
                    observer.on_exit(&job, now);
                }
            }
        }
        self.try_start_all();
    }

    /// Start service at every idle station with queued work, if the line is staffed
    fn try_start_all(&mut self) {
        let now = self.now;
        if !work_calendar::is_working(now) {
            return;
        }
        for line in self.lines.iter_mut() {
            let Some(done_at) = line.station.maybe_start(now, &mut line.queue, &mut self.rng)
            else {
                continue;
            };
            let id = line.station.id();
            self.calendar.schedule(done_at, EventKind::Departure(id));
            if let Some(job) = line.station.current() {
                for observer in &mut self.observers {
                    observer.on_service_start(id, job, now);
                }
            }
        }
    }

    /// Project the current state; never mutates the engine
    pub fn snapshot(&self) -> SystemSnapshot {
        let t = self.now;
        let stations = std::array::from_fn(|i| {
            let line = &self.lines[i];
            let metrics = &self.metrics.stations[i];
            StationView {
                queue_length: line.queue.len(),
                busy: line.station.is_busy(),
                job: line.station.current().cloned(),
                service_rate: line.station.mu(),
                utilization: line.station.utilization(t),
                avg_queue_time: metrics.avg_queue_time(),
                avg_service_time: metrics.avg_service_time(),
                completed: metrics.completed,
            }
        });

        SystemSnapshot {
            t,
            clock: work_calendar::format_date_time(t),
            work_status: work_calendar::work_status(t),
            stations,
            throughput: self.metrics.departures as f64 / t.max(MIN_ELAPSED),
            system: SystemMetrics {
                total_queue_length: self.lines.iter().map(|l| l.queue.len()).sum(),
                avg_system_time: self.metrics.avg_sojourn_time(),
                jobs_entered: self.jobs_entered,
                departures: self.metrics.departures,
            },
            next_arrival_time: self.calendar.next_arrival_time(),
        }
    }

    /// Current simulated time in hours
    pub fn current_time(&self) -> SimTime {
        self.now
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn station(&self, id: StationId) -> &Station {
        &self.lines[id.index()].station
    }

    pub fn queue(&self, id: StationId) -> &JobQueue {
        &self.lines[id.index()].queue
    }

    pub fn metrics(&self) -> &LineMetrics {
        &self.metrics
    }

    /// Items that have entered the first queue since construction
    pub fn jobs_entered(&self) -> u64 {
        self.jobs_entered
    }

    /// Items that have left the last station
    pub fn departures(&self) -> u64 {
        self.metrics.departures
    }

    /// Items queued or in service anywhere on the line
    pub fn jobs_in_system(&self) -> u64 {
        self.lines
            .iter()
            .map(|l| l.queue.len() as u64 + l.station.is_busy() as u64)
            .sum()
    }

    pub fn pending_events(&self) -> usize {
        self.calendar.len()
    }
}
