pub mod core;

// Re-export commonly used types
pub use crate::core::params::{Params, ParamsError, ParamsUpdate};
pub use crate::core::simulation_engine::{SimulationEngine, SimulationObserver};
pub use crate::core::snapshot::SystemSnapshot;
pub use crate::core::types::{Batch, Job, SimTime, StationId, STATIONS, STATION_COUNT};
