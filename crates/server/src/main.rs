use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use omnicall_infra_common::{log_welcome, parse_log_level, setup_logging, LoggingConfig};
use omnicall_server::ServerConfig;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "omnicall-server", version, about = "OmniCall directory API and voice webhooks")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "OMNICALL_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides the configuration
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    config.json_logs |= args.json_logs;

    let level = parse_log_level(&config.log_level)?;
    let mut logging = LoggingConfig::new(level, "omnicall-server");
    if config.json_logs {
        logging = logging.with_json();
    }
    setup_logging(logging)?;
    log_welcome("OmniCall Server", env!("CARGO_PKG_VERSION"));

    let store = omnicall_directory_core::init(&config.directory())
        .await
        .context("failed to open directory database")?;
    let app = omnicall_server::app(Arc::new(store), &config);

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    info!("OmniCall API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}
