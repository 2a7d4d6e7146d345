//! Parking IoT service: CLI server
//!
//! ```sh
//! # Run with default config (~/.config/parking-iot/config.toml)
//! parking-service
//!
//! # Custom config path
//! parking-service --config /etc/parking-iot/config.toml
//!
//! # Override the API port, skip demo data
//! parking-service --port 8081 --no-seed
//!
//! # Validate config without starting
//! parking-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use parking_iot::config::AppConfig;
use parking_iot::server::{init_tracing, ServerHandle, ServerOptions};

/// Parking IoT service: REST API for device-guarded parking spots.
#[derive(Parser, Debug)]
#[command(
    name = "parking-service",
    version,
    about = "Occupancy tracking for IoT-guarded parking spots",
    long_about = "REST API server pairing parking spots with IoT devices and \
                  tracking occupancy from device signals.\n\n\
                  Default config: ~/.config/parking-iot/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "PARKING_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Do not load demo data into an empty store.
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(parking_iot::default_config_path);

    let loaded = AppConfig::load(&config_path);
    if cli.check {
        return match loaded {
            Ok(mut config) => {
                apply_overrides(&mut config, cli.port, cli.log_level.as_deref());
                println!("✅ Configuration is valid");
                println!("   Config file : {}", config_path.display());
                println!("   API address : {}", config.server.address());
                println!("   Storage     : {}", config.database.connection_url());
                println!("   Log level   : {}", config.logging.level);
                println!("   Cooldown    : {}s", config.rate_limit.cooldown_secs);
                println!("   Demo data   : {}", config.seed.enabled && !cli.no_seed);
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        };
    }

    let mut config = match loaded {
        Ok(mut cfg) => {
            apply_overrides(&mut cfg, cli.port, cli.log_level.as_deref());
            // Init tracing first so subsequent logs are formatted properly
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let mut cfg = AppConfig::default();
            apply_overrides(&mut cfg, cli.port, cli.log_level.as_deref());
            init_tracing(&cfg);
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            cfg
        }
    };

    if cli.no_seed {
        info!("CLI override: seed.enabled = false");
        config.seed.enabled = false;
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions::new(config)).await?;

    // Install OS signal handlers (SIGTERM, SIGINT)
    handle.install_signal_handler();

    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    // Wait for shutdown signal, then clean up
    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}

fn apply_overrides(config: &mut AppConfig, port: Option<u16>, log_level: Option<&str>) {
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(level) = log_level {
        config.logging.level = level.to_string();
    }
}
