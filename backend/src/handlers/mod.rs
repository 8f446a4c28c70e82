//! HTTP handlers

pub mod gdd;
pub mod health;
pub mod recalc;

pub use gdd::*;
pub use health::*;
pub use recalc::*;
