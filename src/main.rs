use anyhow::Result;
use depot_charge_planner::{config, pipeline, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::{info, warn};

fn main() -> Result<()> {
    init_tracing();

    let cfg = Config::load()?;
    info!(
        records = %cfg.input.service_records.display(),
        projection = cfg.run.projection,
        "starting depot charge planner"
    );

    if cfg.input.infrastructure.is_none() {
        warn!("no infrastructure description configured, vehicles get synthesized plug ids");
    }

    match pipeline::run(&cfg)? {
        Some(doc) => info!(vehicles = doc.vehicles.len(), "run document ready"),
        None => warn!("no vehicle to plan"),
    }

    Ok(())
}
