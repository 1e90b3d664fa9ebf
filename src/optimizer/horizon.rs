//! Construction of the horizon-wide linear program.
//!
//! Every period contributes ten variables and four equality relations:
//!
//! - battery: `cap_prev + b_chg * batt_eff_chg - b_dis == cap`
//! - DC bus: `s_in + b_dis * batt_eff_dis + i_chg * inv_eff_chg == b_chg + i_dis`
//! - AC bus: `g_in + i_dis * inv_eff_dis == g_out + l_out + i_chg`
//! - money: `g_out * price_sell - g_in * price_buy (+ cap * charge value) == money`
//!
//! All variables are energies per period (Wh), so W limits are divided by the
//! number of periods per hour. The objective maximises the sum of `money`.

use tracing::{debug, info_span, Span};
use uuid::Uuid;

use super::{MiniLpEngine, SolverEngine, VarId};
use crate::domain::{ForecastPoint, HardwareModel, HorizonParams};
use crate::error::DispatchError;

/// Variables of one dispatch period.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PeriodState {
    /// Battery energy at period end
    pub(crate) cap: VarId,
    pub(crate) b_chg: VarId,
    pub(crate) b_dis: VarId,
    /// Solar energy actually taken, at most the forecast PV
    pub(crate) s_in: VarId,
    pub(crate) i_chg: VarId,
    pub(crate) i_dis: VarId,
    /// Load served, fixed at the forecast
    pub(crate) l_out: VarId,
    pub(crate) g_in: VarId,
    pub(crate) g_out: VarId,
    /// Period profit including charge valuation
    pub(crate) money: VarId,
}

impl PeriodState {
    fn declare<E: SolverEngine>(
        engine: &mut E,
        hardware: &HardwareModel,
        point: &ForecastPoint,
        per_hour: f64,
    ) -> Self {
        let (cap_min, cap_max) = hardware.energy_bounds();
        let load = point.load / per_hour;

        Self {
            cap: engine.add_variable(0.0, cap_min, cap_max),
            b_chg: engine.add_variable(0.0, 0.0, hardware.batt_max_chg / per_hour),
            b_dis: engine.add_variable(0.0, 0.0, hardware.batt_max_dis / per_hour),
            s_in: engine.add_variable(0.0, 0.0, point.pv / per_hour),
            i_chg: engine.add_variable(0.0, 0.0, hardware.inv_max_chg / per_hour),
            i_dis: engine.add_variable(0.0, 0.0, hardware.inv_max_dis / per_hour),
            l_out: engine.add_variable(0.0, load, load),
            g_in: engine.add_variable(0.0, 0.0, hardware.grid_max_in / per_hour),
            g_out: engine.add_variable(0.0, 0.0, hardware.grid_max_out / per_hour),
            money: engine.add_variable(1.0, f64::NEG_INFINITY, f64::INFINITY),
        }
    }
}

/// Builds a [`Horizon`] from a hardware model and a forecast.
#[derive(Debug, Clone)]
pub struct HorizonBuilder<'a> {
    hardware: &'a HardwareModel,
    params: HorizonParams,
}

impl<'a> HorizonBuilder<'a> {
    pub fn new(hardware: &'a HardwareModel, params: HorizonParams) -> Self {
        Self { hardware, params }
    }

    /// Build the horizon on the default `minilp` engine.
    pub fn build(&self, forecast: &[ForecastPoint]) -> Result<Horizon, DispatchError> {
        self.build_with(MiniLpEngine::maximizing(), forecast)
    }

    /// Build the horizon on a caller-supplied engine.
    pub fn build_with<E: SolverEngine>(
        &self,
        mut engine: E,
        forecast: &[ForecastPoint],
    ) -> Result<Horizon<E>, DispatchError> {
        let hardware = self.hardware;
        hardware.check()?;
        self.params.check()?;
        if forecast.is_empty() {
            return Err(DispatchError::EmptyForecast);
        }
        let forecast = forecast
            .iter()
            .enumerate()
            .map(|(period, point)| point.guarded(period))
            .collect::<Result<Vec<_>, _>>()?;

        let id = Uuid::new_v4();
        let span = info_span!("horizon", %id, periods = forecast.len());
        let per_hour = self.params.per_hour();
        let intermediate_value = self.params.charge_value_intermediate / hardware.capacity;
        let final_value = self.params.charge_value_final / hardware.capacity;

        let (cap_init, periods) = {
            let _entered = span.enter();

            let cap_init = engine.add_variable(0.0, 0.0, hardware.capacity);
            let mut cap_prev = cap_init;
            let mut periods: Vec<PeriodState> = Vec::with_capacity(forecast.len());
            // The money relation of a period is committed once we know whether
            // it is the last one, since that decides its charge valuation.
            let mut pending_money: Option<Vec<(VarId, f64)>> = None;

            for point in &forecast {
                let state = PeriodState::declare(&mut engine, hardware, point, per_hour);

                if let Some(row) = pending_money.take() {
                    commit_money(&mut engine, row, cap_prev, intermediate_value);
                }

                engine.add_equality(
                    &[
                        (cap_prev, 1.0),
                        (state.b_chg, hardware.batt_eff_chg),
                        (state.b_dis, -1.0),
                        (state.cap, -1.0),
                    ],
                    0.0,
                );
                engine.add_equality(
                    &[
                        (state.s_in, 1.0),
                        (state.b_dis, hardware.batt_eff_dis),
                        (state.i_chg, hardware.inv_eff_chg),
                        (state.b_chg, -1.0),
                        (state.i_dis, -1.0),
                    ],
                    0.0,
                );
                engine.add_equality(
                    &[
                        (state.g_in, 1.0),
                        (state.i_dis, hardware.inv_eff_dis),
                        (state.g_out, -1.0),
                        (state.l_out, -1.0),
                        (state.i_chg, -1.0),
                    ],
                    0.0,
                );
                pending_money = Some(vec![
                    (state.g_out, point.price_sell),
                    (state.g_in, -point.price_buy),
                    (state.money, -1.0),
                ]);

                cap_prev = state.cap;
                periods.push(state);
            }

            if let Some(row) = pending_money {
                commit_money(&mut engine, row, cap_prev, final_value);
            }

            debug!(
                per_hour,
                intermediate_value, final_value, "built horizon linear program"
            );
            (cap_init, periods)
        };

        Ok(Horizon {
            id,
            engine,
            capacity: hardware.capacity,
            per_hour,
            cap_init,
            periods,
            forecast,
            solved: false,
            span,
        })
    }
}

/// Attach the value of charge held in `cap` to a money row and add it.
fn commit_money<E: SolverEngine>(
    engine: &mut E,
    mut row: Vec<(VarId, f64)>,
    cap: VarId,
    charge_value: f64,
) {
    if charge_value > 0.0 {
        row.push((cap, charge_value));
    }
    engine.add_equality(&row, 0.0);
}

/// A built horizon, ready to be re-solved for any starting state of charge.
///
/// Only the starting charge can be changed between solves, through
/// [`Horizon::propose`] and [`Horizon::proposed`]. Both take `&mut self`, so one
/// horizon is never solved from two places at once.
pub struct Horizon<E = MiniLpEngine> {
    pub(crate) id: Uuid,
    pub(crate) engine: E,
    pub(crate) capacity: f64,
    pub(crate) per_hour: f64,
    /// Synthetic predecessor of period 0, pinned to the measured charge
    pub(crate) cap_init: VarId,
    pub(crate) periods: Vec<PeriodState>,
    /// Forecast after the arbitrage guard
    pub(crate) forecast: Vec<ForecastPoint>,
    pub(crate) solved: bool,
    pub(crate) span: Span,
}

impl<E> Horizon<E> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Number of periods
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Forecast the program was built from, after the arbitrage guard
    pub fn forecast(&self) -> &[ForecastPoint] {
        &self.forecast
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E> std::fmt::Debug for Horizon<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Horizon")
            .field("id", &self.id)
            .field("periods", &self.periods.len())
            .field("capacity", &self.capacity)
            .field("per_hour", &self.per_hour)
            .field("solved", &self.solved)
            .finish()
    }
}
