use itertools::{Itertools, MinMaxResult};
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{BatteryAction, ForecastPoint, HardwareModel, HorizonParams, Proposal};
use crate::error::DispatchError;
use crate::optimizer::HorizonBuilder;

/// Replays a forecast through the model-predictive loop.
///
/// Each step optimises the next `window` periods, acts on period 0 only, and
/// starts the following step from the SoC that period 0 ends with.
#[derive(Debug, Clone)]
pub struct RollingHorizon<'a> {
    builder: HorizonBuilder<'a>,
    window: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationStep {
    pub index: usize,
    pub soc_start: f64,
    pub action: BatteryAction,
    pub proposal: Proposal,
    /// Real money exchanged with the grid in this step
    pub cash_flow: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub steps: Vec<SimulationStep>,
    pub initial_soc: f64,
    pub final_soc: f64,
}

impl<'a> RollingHorizon<'a> {
    pub fn new(
        hardware: &'a HardwareModel,
        params: HorizonParams,
        window: usize,
    ) -> Result<Self, DispatchError> {
        if window == 0 {
            let mut errors = validator::ValidationErrors::new();
            errors.add("window", validator::ValidationError::new("range"));
            return Err(DispatchError::InvalidParameters(errors));
        }
        Ok(Self {
            builder: HorizonBuilder::new(hardware, params),
            window,
        })
    }

    pub fn run(
        &self,
        forecast: &[ForecastPoint],
        initial_soc: f64,
    ) -> Result<SimulationReport, DispatchError> {
        if forecast.is_empty() {
            return Err(DispatchError::EmptyForecast);
        }

        let mut soc = initial_soc;
        let mut steps = Vec::with_capacity(forecast.len());

        for index in 0..forecast.len() {
            let end = (index + self.window).min(forecast.len());
            let mut horizon = self.builder.build(&forecast[index..end])?;
            let proposal = horizon.propose(soc)?;
            let cash_flow = horizon
                .flows()
                .and_then(|mut flows| flows.next())
                .map_or(0.0, |flows| flows.cash_flow);

            let step = SimulationStep {
                index,
                soc_start: soc,
                action: proposal.action(soc),
                proposal,
                cash_flow,
            };
            debug!(
                index,
                horizon = %horizon.id(),
                action = %step.action,
                grid_power = proposal.grid_power,
                soc = proposal.soc,
                "simulated step"
            );
            steps.push(step);

            // Solver noise can leave the SoC a hair outside [0, 1]
            soc = proposal.soc.clamp(0.0, 1.0);
        }

        let report = SimulationReport {
            steps,
            initial_soc,
            final_soc: soc,
        };
        info!(
            steps = report.steps.len(),
            total_cash_flow = report.total_cash_flow(),
            final_soc = report.final_soc,
            "finished rolling horizon"
        );
        Ok(report)
    }
}

impl SimulationReport {
    /// Real money exchanged with the grid over all steps
    pub fn total_cash_flow(&self) -> f64 {
        self.steps.iter().map(|step| step.cash_flow).sum()
    }

    /// Sum of period 0 results including the charge valuation terms
    pub fn total_money(&self) -> f64 {
        self.steps.iter().map(|step| step.proposal.money).sum()
    }

    /// Net grid energy (Wh) given the period length in hours
    pub fn net_grid_energy(&self, period_hours: f64) -> f64 {
        self.steps
            .iter()
            .map(|step| step.proposal.grid_power * period_hours)
            .sum()
    }

    /// Lowest and highest SoC reached at the end of a step
    pub fn soc_range(&self) -> Option<(f64, f64)> {
        match self.steps.iter().map(|step| step.proposal.soc).minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(soc) => Some((soc, soc)),
            MinMaxResult::MinMax(min, max) => Some((min, max)),
        }
    }
}
