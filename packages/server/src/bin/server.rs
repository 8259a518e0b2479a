//! Antenna game server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin antenna-server
//! cargo run --bin antenna-server -- --host 0.0.0.0 --port 3000 --debug
//! CONFIG=antenna.json cargo run --bin antenna-server
//! ```

use std::sync::Arc;

use antenna_server::{
    config::{Args, ServerConfig},
    game::CardCatalog,
    ui::{AppState, Server},
};
use antenna_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    let default_level = if args.debug { "debug" } else { "info" };
    setup_logger(env!("CARGO_BIN_NAME"), default_level);

    // 1. Configuration
    let config = match ServerConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };
    if config.debug {
        tracing::info!("Debug mode: `!<user_id>` tokens are accepted");
    }

    // 2. Card catalog
    let catalog = match CardCatalog::builtin() {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("Invalid card catalog: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Loaded {} cards and {} keywords",
        catalog.cards().len(),
        catalog.keywords().len()
    );

    // 3. Stores, rooms and use cases
    let state = AppState::in_memory(&config, catalog, Arc::new(SystemClock));

    // 4. Run the server
    if let Err(e) = Server::new(state).run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
