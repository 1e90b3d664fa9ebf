//! # Rolling-Horizon Simulation
//!
//! Replays a long forecast through the dispatch loop the way a live
//! controller would run it: at every period a fresh horizon is built over the
//! next few forecast points, only the first decision is applied, and the SoC
//! it produces becomes the measured SoC of the next step.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use energy_dispatch::domain::{ForecastPoint, HardwareModel, HorizonParams};
//! use energy_dispatch::simulation::RollingHorizon;
//!
//! # fn run(hardware: &HardwareModel, forecast: &[ForecastPoint]) -> anyhow::Result<()> {
//! let rolling = RollingHorizon::new(hardware, HorizonParams::default(), 24)?;
//! let report = rolling.run(forecast, 0.5)?;
//! println!("earned {:.2}", report.total_cash_flow());
//! # Ok(())
//! # }
//! ```

pub mod rolling;

pub use rolling::{RollingHorizon, SimulationReport, SimulationStep};
