pub mod batching;
pub mod event_calendar;
pub mod metrics;
pub mod params;
pub mod queue;
pub mod rng;
pub mod simulation_engine;
pub mod snapshot;
pub mod station;
pub mod types;
pub mod work_calendar;
