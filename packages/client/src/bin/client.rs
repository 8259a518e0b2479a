//! Terminal client for an Antenna room channel.
//!
//! Prints every server message in a readable form and sends the commands
//! typed at the prompt. Lost connections are retried up to 5 times, 5 seconds
//! apart.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin antenna-client -- --url ws://127.0.0.1:8080/room/1/channel --token <token>
//! ```

use clap::Parser;

use antenna_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "antenna-client")]
#[command(about = "Terminal client for Antenna rooms", long_about = None)]
struct Args {
    /// Room channel URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/room/1/channel")]
    url: String,

    /// Session token from sign-up
    #[arg(short = 't', long, env = "ANTENNA_TOKEN")]
    token: String,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = antenna_client::run_client(args.url, args.token).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
