//! Business logic services

pub mod gdd;
pub mod pool;
pub mod recalc;
pub mod scheduler;
pub mod weather;

pub use gdd::GddModelService;
pub use pool::{PoolWorkers, RecalcJob, RecalcPool};
pub use recalc::{RecalcReport, RecalcService, RecalcSettings};
pub use scheduler::Scheduler;
pub use weather::WeatherService;
