//! imgFS Server Binary
//!
//! Serves one container over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use imgfs::network::Server;
use imgfs::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// imgFS Server
#[derive(Parser, Debug)]
#[command(name = "imgfs-server")]
#[command(about = "HTTP front end for an imgFS container")]
#[command(version)]
struct Args {
    /// Container file to serve
    container: PathBuf,

    /// Listen port
    #[arg(default_value_t = imgfs::config::DEFAULT_PORT)]
    port: u16,

    /// Listen host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// HTML page served at / and /index.html
    #[arg(long)]
    index_file: Option<PathBuf>,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "64")]
    max_connections: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,imgfs=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("imgFS Server v{}", imgfs::VERSION);
    tracing::info!("Container: {}", args.container.display());

    let mut builder = Config::builder()
        .container_path(&args.container)
        .listen_host(&args.host)
        .port(args.port)
        .max_connections(args.max_connections);
    if let Some(index) = &args.index_file {
        builder = builder.index_file(index);
    }
    let config = builder.build();

    let engine = match Engine::open_path(&config.container_path) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open container: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("\n{}", engine.header());

    let mut server = Server::new(config, engine);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
