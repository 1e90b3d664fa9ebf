use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::{HardwareModel, HorizonParams};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub hardware: HardwareModel,
    #[serde(default)]
    pub horizon: HorizonParams,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// JSON array of forecast points
    pub forecast_path: PathBuf,
    pub initial_soc: f64,
    /// Periods optimised jointly at every step
    pub window_periods: usize,
}

impl Config {
    pub fn figment() -> Figment {
        Self::figment_at("config/default.toml")
    }

    pub fn figment_at(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("DISPATCH__").split("__"))
    }

    pub fn load() -> Result<Self> {
        Ok(Self::figment().extract()?)
    }
}
