//! LiteKV - A Small In-Memory Key-Value Cache
//!
//! Entry point for the server: parses configuration, sets up logging,
//! creates the store and janitor, and accepts connections until Ctrl+C.

use anyhow::Context;
use clap::Parser;
use litekv::commands::CommandDispatcher;
use litekv::connection::{handle_connection, ConnectionStats};
use litekv::storage::{Janitor, JanitorConfig, Store};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Server configuration
#[derive(Parser, Debug)]
#[command(name = "litekv", version, about = "A small in-memory key-value cache with TTL support")]
#[command(after_help = "EXAMPLES:\n    litekv                      # Start on 127.0.0.1:6379\n    litekv --port 6380          # Start on port 6380\n    litekv --host 0.0.0.0       # Listen on all interfaces\n\nCONNECTING:\n    $ printf 'SET name Ariel\\r\\nGET name\\r\\n' | nc 127.0.0.1 6379")]
struct Config {
    /// Host to bind to
    #[arg(long, default_value = litekv::DEFAULT_HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = litekv::DEFAULT_PORT)]
    port: u16,

    /// Milliseconds between janitor sweeps
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    sweep_interval_ms: u64,

    /// Log filter used when RUST_LOG is not set (e.g. "debug", "litekv=trace")
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Config {
    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn janitor_config(&self) -> JanitorConfig {
        JanitorConfig {
            interval: Duration::from_millis(self.sweep_interval_ms),
        }
    }
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("invalid log filter '{}'", config.log_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

fn print_banner(config: &Config) {
    println!(
        r#"
LiteKV v{} - In-Memory Key-Value Cache
──────────────────────────────────────
Server started on {}
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        litekv::VERSION,
        config.bind_address()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_logging(&config)?;

    // Created once, shared by every connection and the janitor
    let store = Arc::new(Store::new());

    let janitor = Janitor::start(Arc::clone(&store), config.janitor_config());

    let stats = Arc::new(ConnectionStats::new());

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address()))?;

    print_banner(&config);
    info!("Listening on {}", config.bind_address());

    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received, stopping server..."),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = accept_loop(listener, Arc::clone(&store), Arc::clone(&stats)) => {}
        _ = shutdown => {}
    }

    drop(janitor);

    let connections = stats.snapshot();
    info!(
        accepted = connections.accepted,
        active = connections.active,
        commands = connections.commands,
        "Connection totals"
    );

    let final_stats = store.stats();
    info!(
        keys = final_stats.keys,
        sets = final_stats.sets,
        gets = final_stats.gets,
        hits = final_stats.hits,
        misses = final_stats.misses,
        expired_lazy = final_stats.expired_lazy,
        expired_swept = final_stats.expired_swept,
        "Server shutdown complete"
    );
    Ok(())
}

/// Accepts connections forever, one task per client
async fn accept_loop(listener: TcpListener, store: Arc<Store>, stats: Arc<ConnectionStats>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let dispatcher = CommandDispatcher::new(Arc::clone(&store));
                let stats = Arc::clone(&stats);

                tokio::spawn(async move {
                    handle_connection(stream, addr, dispatcher, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
