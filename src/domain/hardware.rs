use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::DispatchError;

/// Static limits and efficiencies of one installation.
///
/// Energies are in Wh, powers in W, state-of-charge bounds and efficiencies
/// are fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_hardware_model"))]
pub struct HardwareModel {
    /// Usable battery capacity (Wh)
    #[validate(range(exclusive_min = 0.0))]
    pub capacity: f64,

    /// Lowest allowed state of charge (0-1)
    #[validate(range(min = 0.0, max = 1.0))]
    pub batt_min_soc: f64,

    /// Highest allowed state of charge (0-1)
    #[validate(range(min = 0.0, max = 1.0))]
    pub batt_max_soc: f64,

    /// Maximum battery charge power (W)
    #[validate(range(min = 0.0))]
    pub batt_max_chg: f64,

    /// Maximum battery discharge power (W)
    #[validate(range(min = 0.0))]
    pub batt_max_dis: f64,

    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub batt_eff_chg: f64,

    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub batt_eff_dis: f64,

    /// Maximum inverter power from AC into the DC bus (W)
    #[validate(range(min = 0.0))]
    pub inv_max_chg: f64,

    /// Maximum inverter power from the DC bus out to AC (W)
    #[validate(range(min = 0.0))]
    pub inv_max_dis: f64,

    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub inv_eff_chg: f64,

    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub inv_eff_dis: f64,

    /// Grid import limit (W)
    #[validate(range(min = 0.0))]
    pub grid_max_in: f64,

    /// Grid export limit (W)
    #[validate(range(min = 0.0))]
    pub grid_max_out: f64,
}

impl HardwareModel {
    /// Check every invariant, mapping failures to [`DispatchError::InvalidHardwareModel`].
    pub fn check(&self) -> Result<(), DispatchError> {
        self.validate().map_err(DispatchError::InvalidHardwareModel)
    }

    /// Stored energy bounds (Wh) implied by the state-of-charge window
    pub fn energy_bounds(&self) -> (f64, f64) {
        (
            self.capacity * self.batt_min_soc,
            self.capacity * self.batt_max_soc,
        )
    }

    fn values(&self) -> [f64; 13] {
        [
            self.capacity,
            self.batt_min_soc,
            self.batt_max_soc,
            self.batt_max_chg,
            self.batt_max_dis,
            self.batt_eff_chg,
            self.batt_eff_dis,
            self.inv_max_chg,
            self.inv_max_dis,
            self.inv_eff_chg,
            self.inv_eff_dis,
            self.grid_max_in,
            self.grid_max_out,
        ]
    }
}

fn validate_hardware_model(model: &HardwareModel) -> Result<(), ValidationError> {
    if model.values().iter().any(|value| !value.is_finite()) {
        let mut error = ValidationError::new("not_finite");
        error.message = Some("all limits and efficiencies must be finite".into());
        return Err(error);
    }
    if model.batt_min_soc >= model.batt_max_soc {
        let mut error = ValidationError::new("soc_window");
        error.message = Some("batt_min_soc must be below batt_max_soc".into());
        return Err(error);
    }
    Ok(())
}

/// Horizon-wide parameters that sit next to the hardware model.
///
/// Both charge values are the worth of a *full* battery in the price
/// currency, so `value / capacity` has the same unit as the prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_horizon_params"))]
pub struct HorizonParams {
    /// Dispatch periods per hour; W limits are divided by this to get Wh per
    /// period. Fractions are allowed, 0.5 means two-hour periods.
    #[validate(range(exclusive_min = 0.0))]
    pub periods_per_hour: f64,

    /// Value of charge held at the end of every period but the last
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub charge_value_intermediate: f64,

    /// Value of charge retained at the end of the horizon
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub charge_value_final: f64,
}

impl Default for HorizonParams {
    fn default() -> Self {
        Self {
            periods_per_hour: 1.0,
            charge_value_intermediate: 0.0,
            charge_value_final: 0.0,
        }
    }
}

impl HorizonParams {
    pub fn check(&self) -> Result<(), DispatchError> {
        self.validate().map_err(DispatchError::InvalidParameters)
    }

    pub fn per_hour(&self) -> f64 {
        self.periods_per_hour
    }

    /// Length of one period in hours
    pub fn period_hours(&self) -> f64 {
        1.0 / self.periods_per_hour
    }
}

fn validate_horizon_params(params: &HorizonParams) -> Result<(), ValidationError> {
    let values = [
        params.periods_per_hour,
        params.charge_value_intermediate,
        params.charge_value_final,
    ];
    if !values.iter().all(|value| value.is_finite()) {
        let mut error = ValidationError::new("not_finite");
        error.message = Some("horizon parameters must be finite".into());
        return Err(error);
    }
    Ok(())
}
