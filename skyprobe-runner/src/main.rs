//! Skyprobe Runner - star size smoke test for a running Gaia Sky
//!
//! This binary:
//! - Loads gateway settings from `skyprobe.toml` if present
//! - Connects to the scripting gateway
//! - Sweeps the star size with a remote pause after each change
//! - Exits non-zero if any step fails

use anyhow::Result;
use skyprobe::prelude::*;
use tracing::{error, info, Level};

const CONFIG_FILE: &str = "skyprobe.toml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Starting star size smoke test...");

    let config = ConfigStore::from_optional_file(CONFIG_FILE)?;
    match config.path() {
        Some(path) if !config.has_section(GatewayConfig::PREFIX) => {
            info!("No [{}] section in {}, using defaults", GatewayConfig::PREFIX, path.display());
        }
        Some(_) => {}
        None => info!("No {} found, using default gateway settings", CONFIG_FILE),
    }
    let gateway: GatewayConfig = config.get()?;

    info!("Gateway endpoint: {}", gateway.endpoint());
    if gateway.auth_token.is_some() {
        info!("Auth token configured");
    }

    let connector = Py4jConnector::new(gateway);
    let plan = SmokePlan::star_size_sweep();

    match run_smoke_test(&connector, &plan).await {
        Ok(report) => {
            info!("Smoke test passed: {}", serde_json::to_string(&report)?);
            Ok(())
        }
        Err(e) => {
            error!("Smoke test failed: {}", e);
            Err(e.into())
        }
    }
}
