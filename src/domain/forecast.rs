use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Relative upward nudge applied to a buy price equal to its sell price.
///
/// Equal prices leave the objective indifferent between importing and
/// exporting the same energy, which makes the optimum degenerate.
pub const EQUAL_PRICE_PERTURBATION: f64 = 0.001;

/// Projected data for one dispatch period.
///
/// Prices are per Wh, load and PV are average powers in W.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub price_buy: f64,
    pub price_sell: f64,
    pub load: f64,
    pub pv: f64,
}

impl ForecastPoint {
    pub fn new(price_buy: f64, price_sell: f64, load: f64, pv: f64) -> Self {
        Self {
            price_buy,
            price_sell,
            load,
            pv,
        }
    }

    /// Apply the arbitrage guard, returning the point the LP is built from.
    ///
    /// A buy price equal to the sell price is moved up by
    /// [`EQUAL_PRICE_PERTURBATION`] of its magnitude; a buy price strictly
    /// below the sell price is rejected.
    pub fn guarded(&self, period: usize) -> Result<Self, DispatchError> {
        if !self.price_buy.is_finite() || !self.price_sell.is_finite() {
            return Err(DispatchError::InvalidForecast {
                period,
                reason: "prices must be finite",
            });
        }
        if !self.load.is_finite() || self.load < 0.0 {
            return Err(DispatchError::InvalidForecast {
                period,
                reason: "load must be finite and non-negative",
            });
        }
        if !self.pv.is_finite() || self.pv < 0.0 {
            return Err(DispatchError::InvalidForecast {
                period,
                reason: "pv must be finite and non-negative",
            });
        }

        if self.price_buy < self.price_sell {
            return Err(DispatchError::ArbitrageViolation {
                period,
                price_buy: self.price_buy,
                price_sell: self.price_sell,
            });
        }

        let mut point = *self;
        if point.price_buy == point.price_sell {
            point.price_buy += point.price_buy.abs() * EQUAL_PRICE_PERTURBATION;
        }
        Ok(point)
    }
}

impl From<(f64, f64, f64, f64)> for ForecastPoint {
    fn from((price_buy, price_sell, load, pv): (f64, f64, f64, f64)) -> Self {
        Self::new(price_buy, price_sell, load, pv)
    }
}
