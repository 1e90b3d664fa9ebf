//! Solving a built [`Horizon`] for a measured state of charge and reading the
//! result back.
//!
//! Only period 0 of a solve is meant to be acted on. Later periods are
//! re-optimised on the next call with a fresh forecast and the real SoC.

use std::iter::FusedIterator;
use std::slice;

use tracing::{debug, warn};

use super::horizon::{Horizon, PeriodState};
use super::SolverEngine;
use crate::domain::{PeriodFlows, Proposal};
use crate::error::DispatchError;

impl<E: SolverEngine> Horizon<E> {
    /// Solve for the current state of charge and return the period 0 decision.
    pub fn propose(&mut self, soc: f64) -> Result<Proposal, DispatchError> {
        self.solve(soc)?;
        Ok(self.proposal(&self.periods[0]))
    }

    /// Solve for the current state of charge and iterate over every period.
    ///
    /// The first item equals what [`Horizon::propose`] returns for the same SoC.
    pub fn proposed(&mut self, soc: f64) -> Result<Proposals<'_, E>, DispatchError> {
        self.solve(soc)?;
        let horizon: &Self = self;
        Ok(Proposals {
            horizon,
            periods: horizon.periods.iter(),
        })
    }

    /// Detailed flows of the last successful solve.
    pub fn flows(&self) -> Option<impl Iterator<Item = PeriodFlows> + '_> {
        self.solved.then(|| {
            self.periods
                .iter()
                .zip(&self.forecast)
                .map(|(period, point)| {
                    let grid_in = self.read(period.g_in);
                    let grid_out = self.read(period.g_out);
                    PeriodFlows {
                        battery_charge: self.power(period.b_chg),
                        battery_discharge: self.power(period.b_dis),
                        solar: self.power(period.s_in),
                        inverter_charge: self.power(period.i_chg),
                        inverter_discharge: self.power(period.i_dis),
                        load: self.power(period.l_out),
                        grid_in: grid_in * self.per_hour,
                        grid_out: grid_out * self.per_hour,
                        soc: self.read(period.cap) / self.capacity,
                        money: self.read(period.money),
                        cash_flow: grid_out * point.price_sell - grid_in * point.price_buy,
                    }
                })
        })
    }

    /// Solved charge (Wh) before period 0, equal to `soc * capacity`.
    pub fn initial_charge(&self) -> Option<f64> {
        self.solved.then(|| self.read(self.cap_init))
    }

    fn solve(&mut self, soc: f64) -> Result<(), DispatchError> {
        let _entered = self.span.enter();

        if !soc.is_finite() || !(0.0..=1.0).contains(&soc) {
            return Err(DispatchError::InvalidStateOfCharge(soc));
        }

        self.solved = false;
        match self.engine.solve_pinned(self.cap_init, soc * self.capacity) {
            Ok(()) => {
                self.solved = true;
                debug!(soc, "solved horizon");
                Ok(())
            }
            Err(error) => {
                warn!(soc, %error, "failed to solve horizon");
                Err(error.into())
            }
        }
    }

    fn proposal(&self, period: &PeriodState) -> Proposal {
        Proposal {
            grid_power: (self.read(period.g_in) - self.read(period.g_out)) * self.per_hour,
            soc: self.read(period.cap) / self.capacity,
            money: self.read(period.money),
        }
    }

    fn power(&self, var: super::VarId) -> f64 {
        self.read(var) * self.per_hour
    }

    /// Engines report every value after a successful solve; NaN marks a broken engine.
    fn read(&self, var: super::VarId) -> f64 {
        self.engine.value(var).unwrap_or(f64::NAN)
    }
}

/// Per-period proposals of one solve, in forecast order.
pub struct Proposals<'a, E> {
    horizon: &'a Horizon<E>,
    periods: slice::Iter<'a, PeriodState>,
}

impl<E> Clone for Proposals<'_, E> {
    fn clone(&self) -> Self {
        Self {
            horizon: self.horizon,
            periods: self.periods.clone(),
        }
    }
}

impl<E: SolverEngine> Iterator for Proposals<'_, E> {
    type Item = Proposal;

    fn next(&mut self) -> Option<Proposal> {
        self.periods
            .next()
            .map(|period| self.horizon.proposal(period))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.periods.size_hint()
    }
}

impl<E: SolverEngine> ExactSizeIterator for Proposals<'_, E> {}

impl<E: SolverEngine> FusedIterator for Proposals<'_, E> {}
