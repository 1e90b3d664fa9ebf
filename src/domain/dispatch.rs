use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

/// SoC changes smaller than this are reported as [`BatteryAction::Hold`]
const SOC_DEADBAND: f64 = 1e-6;

/// Decision for one period as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// Net grid power (W): positive imports, negative exports
    pub grid_power: f64,
    /// State of charge at the end of the period (0-1)
    pub soc: f64,
    /// Period result in price currency, including the charge valuation terms
    pub money: f64,
}

impl Proposal {
    pub fn is_importing(&self) -> bool {
        self.grid_power > 0.0
    }

    pub fn is_exporting(&self) -> bool {
        self.grid_power < 0.0
    }

    /// Classify the battery movement relative to the SoC at period start
    pub fn action(&self, soc_start: f64) -> BatteryAction {
        let delta = self.soc - soc_start;
        if delta > SOC_DEADBAND {
            BatteryAction::Charge
        } else if delta < -SOC_DEADBAND {
            BatteryAction::Discharge
        } else {
            BatteryAction::Hold
        }
    }
}

impl From<Proposal> for (f64, f64, f64) {
    fn from(proposal: Proposal) -> Self {
        (proposal.grid_power, proposal.soc, proposal.money)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BatteryAction {
    Charge,
    Discharge,
    Hold,
}

/// Every solved quantity of one period, converted back to average power (W).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodFlows {
    pub battery_charge: f64,
    pub battery_discharge: f64,
    pub solar: f64,
    pub inverter_charge: f64,
    pub inverter_discharge: f64,
    pub load: f64,
    pub grid_in: f64,
    pub grid_out: f64,
    pub soc: f64,
    pub money: f64,
    /// Real money exchanged with the grid, without charge valuation
    pub cash_flow: f64,
}

impl PeriodFlows {
    pub fn grid_power(&self) -> f64 {
        self.grid_in - self.grid_out
    }
}
