//! Franchise HTTP server entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the database.
//! - Serve the franchise router until Ctrl-C.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::{CliArgs, ServerConfig};
use franchise_core::db::{open_target, DbTarget};
use franchise_core::{init_logging, init_stderr_logging};
use log::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_args(CliArgs::parse())?;
    config.validate()?;
    start_logging(&config)?;

    let conn = open_target(&config.database).context("failed to open franchise database")?;
    let app = franchise_api::router(conn);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(
        "event=server_start module=cli status=ok bind={} db={}",
        config.bind,
        describe_database(&config.database)
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated with an error")?;

    info!("event=server_stop module=cli status=ok");
    Ok(())
}

fn start_logging(config: &ServerConfig) -> Result<()> {
    let result = match &config.log_dir {
        Some(dir) => init_logging(&config.log_level, &dir.to_string_lossy()),
        None => init_stderr_logging(&config.log_level),
    };
    result.map_err(anyhow::Error::msg)
}

fn describe_database(target: &DbTarget) -> String {
    match target {
        DbTarget::File(path) => path.display().to_string(),
        DbTarget::Memory => "memory".to_string(),
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("event=server_shutdown module=cli status=start signal=ctrl_c"),
        Err(err) => {
            // Without a handler the server keeps running until killed.
            error!("event=server_shutdown module=cli status=error error={err}");
            std::future::pending::<()>().await;
        }
    }
}
