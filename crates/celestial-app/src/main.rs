//! The binary entry point for Celestial.

use clap::Parser;
use tracing::{error, info};

use celestial_app::run;
use celestial_config::{CliArgs, Config, default_config_dir};
use celestial_cosmic::{CosmicGateway, GeminiClient};

fn main() {
    let args = CliArgs::parse();

    let resolved = match args.config.clone() {
        Some(dir) => Ok(dir),
        None => default_config_dir(),
    };
    let config_dir = match resolved {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to resolve config directory: {e}");
            std::process::exit(1);
        }
    };
    let mut config = match Config::load_or_default(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_dir.display());
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    celestial_log::init_logging(&config, cfg!(debug_assertions));
    info!(config_dir = %config_dir.display(), model = %config.gateway.model, "Celestial starting");

    let gateway = CosmicGateway::new(GeminiClient::from_config(&config.gateway));
    if let Err(e) = run(config, gateway) {
        error!("Event loop failed: {e}");
        std::process::exit(1);
    }
}
