// Library root: the draft decision engine.
//
// Leaf data (roles, catalog, pair tables) at the bottom; the solver, pressure
// metric and sequencer above it; the oracle seam, delta analyzer,
// recommendation engine, insights and the draft simulator on top.

pub mod assignment;
pub mod catalog;
pub mod config;
pub mod delta;
pub mod error;
pub mod insights;
pub mod oracle;
pub mod pressure;
pub mod recommend;
pub mod role;
pub mod sequence;
pub mod simulate;
pub mod state;
pub mod tables;

pub use error::{DataError, DraftError, OracleError};
