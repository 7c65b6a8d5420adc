//! Rowing Conditions Service
//!
//! Answers "can I row today?" from the latest Thames flow at Reading.
//!
//! Usage:
//!   cargo run --release                      # Print the current advisory and exit
//!   cargo run --release -- --endpoint        # Serve the skill over HTTP on endpoint.port
//!   cargo run --release -- --endpoint 9000   # Serve the skill over HTTP on port 9000
//!   cargo run --release -- --config my.toml  # Use a specific config file
//!
//! Environment:
//!   RUST_LOG - log filter (overrides `logging.filter` in rowcheck.toml)

use clap::Parser;
use rowcheck_service::cache::ReadingCache;
use rowcheck_service::config;
use rowcheck_service::endpoint;
use rowcheck_service::ingest::ea::HttpMeasureSource;
use rowcheck_service::skill::FETCH_FAILED_SPEECH;
use std::error::Error;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rowcheck", version, about = "Can I row today? Thames flow advisories for Reading")]
struct Cli {
    /// Serve the skill over HTTP, on PORT if given, else on endpoint.port
    #[arg(long, value_name = "PORT", num_args = 0..=1)]
    endpoint: Option<Option<u16>>,

    /// Configuration file (defaults to ./rowcheck.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = config::load_or_default(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    let source = HttpMeasureSource::new(config.upstream.timeout())?;
    info!(
        url = source.url(),
        timeout_secs = config.upstream.timeout_secs,
        "upstream configured"
    );
    let cache = ReadingCache::new(source);

    match cli.endpoint {
        Some(port) => {
            let port = port.unwrap_or(config.endpoint.port);
            let addr = format!("{}:{}", config.endpoint.bind_address, port);
            info!("🚣 Starting rowing conditions endpoint");
            endpoint::start_endpoint_server(&addr, &cache)?;
        }
        None => match cache.current_advisory() {
            Ok(advisory) => {
                info!(tier = ?advisory.tier, "advisory ready");
                println!("{}", advisory.message);
            }
            Err(e) => {
                error!(error = %e, "could not build advisory");
                println!("{}", FETCH_FAILED_SPEECH);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
