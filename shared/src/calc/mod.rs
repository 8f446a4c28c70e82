//! Pure calculators shared by the server and the browser bindings

pub mod disease;
pub mod gdd;
pub mod growth;
pub mod ledger;
pub mod water;
pub mod weed;
