//! Rolling-horizon LP dispatch for a battery behind a hybrid inverter with
//! PV and a grid connection.
//!
//! A [`HorizonBuilder`] turns a hardware model and a price/load/PV forecast
//! into a linear program. The resulting [`Horizon`] is solved for a measured
//! state of charge and yields one [`Proposal`] per period.

pub mod config;
pub mod domain;
pub mod error;
pub mod optimizer;
pub mod simulation;
pub mod telemetry;

pub use domain::{ForecastPoint, HardwareModel, HorizonParams, PeriodFlows, Proposal};
pub use error::{DispatchError, SolverError};
pub use optimizer::{Horizon, HorizonBuilder, Proposals};
