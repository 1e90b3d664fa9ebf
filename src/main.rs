use anyhow::{Context, Result};
use energy_dispatch::{config, simulation::RollingHorizon, telemetry, ForecastPoint};
use config::Config;
use telemetry::init_tracing;
use tracing::info;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;
    cfg.hardware.check()?;

    let path = &cfg.simulation.forecast_path;
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading forecast {}", path.display()))?;
    let forecast: Vec<ForecastPoint> =
        serde_json::from_str(&raw).with_context(|| format!("parsing forecast {}", path.display()))?;

    info!(
        periods = forecast.len(),
        window = cfg.simulation.window_periods,
        periods_per_hour = cfg.horizon.periods_per_hour,
        "starting rolling horizon"
    );

    let rolling = RollingHorizon::new(&cfg.hardware, cfg.horizon, cfg.simulation.window_periods)?;
    let report = rolling.run(&forecast, cfg.simulation.initial_soc)?;

    let period_hours = cfg.horizon.period_hours();
    info!(
        total_cash_flow = report.total_cash_flow(),
        net_grid_energy = report.net_grid_energy(period_hours),
        final_soc = report.final_soc,
        "simulation complete"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
