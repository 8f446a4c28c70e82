//! Domain models for the Turf Metrics platform

mod disease;
mod gdd;
mod growth;
mod lawn;
mod task;
mod water;
mod weather;
mod weed;

pub use disease::*;
pub use gdd::*;
pub use growth::*;
pub use lawn::*;
pub use task::*;
pub use water::*;
pub use weather::*;
pub use weed::*;
