//! Shared types, models and calculators for the Turf Metrics platform
//!
//! This crate contains the domain model and every pure agronomic calculation
//! (GDD accumulation, reset ledger, disease risk, growth potential, weed
//! pressure, water balance). It is shared between the backend service and the
//! browser client (via WASM) and performs no I/O.

pub mod calc;
pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
