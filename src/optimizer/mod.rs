//! Horizon linear program: construction, solving and result extraction.

pub mod dispatch;
pub mod engine;
pub mod horizon;
pub mod simplex;

pub use dispatch::Proposals;
pub use engine::{SolverEngine, VarId};
pub use horizon::{Horizon, HorizonBuilder};
pub use simplex::MiniLpEngine;

#[cfg(test)]
pub use engine::MockSolverEngine;
