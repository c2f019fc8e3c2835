//! Binary entry: wires the bridge library to real stdin/stdout.

use tracing_subscriber::EnvFilter;
use ytdlp_bridge::{Bridge, Config};

#[tokio::main]
async fn main() {
    // stdout carries the wire protocol; every diagnostic goes to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    let bridge = Bridge::new(config, tokio::io::stdout());
    if let Err(error) = bridge.run(tokio::io::stdin()).await {
        tracing::error!(error = %error, "bridge terminated abnormally");
        std::process::exit(1);
    }
}
