//! Server configuration resolved from flags and environment variables.

use anyhow::Result;
use clap::Parser;
use franchise_core::db::DbTarget;
use franchise_core::default_log_level;
use franchise_core::logging::normalize_level;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND: ([u8; 4], u16) = ([127, 0, 0, 1], 8080);
const DEFAULT_DB_PATH: &str = "franchises.sqlite3";

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "franchise-server",
    about = "HTTP service managing franchises, branches and product stock",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        env = "FRANCHISE_BIND",
        value_name = "ADDR",
        help = "Socket address the HTTP server listens on"
    )]
    pub bind: Option<SocketAddr>,

    #[arg(
        long,
        env = "FRANCHISE_DB_PATH",
        value_name = "FILE",
        help = "SQLite database file",
        conflicts_with = "in_memory"
    )]
    pub db_path: Option<PathBuf>,

    #[arg(
        long,
        env = "FRANCHISE_IN_MEMORY",
        help = "Keep all data in memory; nothing survives a restart"
    )]
    pub in_memory: bool,

    #[arg(
        long,
        env = "FRANCHISE_LOG_LEVEL",
        value_name = "LEVEL",
        help = "One of trace|debug|info|warn|error"
    )]
    pub log_level: Option<String>,

    #[arg(
        long,
        env = "FRANCHISE_LOG_DIR",
        value_name = "DIR",
        help = "Absolute directory for rolling log files; stderr when unset"
    )]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub database: DbTarget,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            bind,
            db_path,
            in_memory,
            log_level,
            log_dir,
        } = args;

        let database = if in_memory {
            DbTarget::Memory
        } else {
            DbTarget::File(db_path.unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)))
        };

        Ok(Self {
            bind: bind.unwrap_or_else(|| SocketAddr::from(DEFAULT_BIND)),
            database,
            log_level: log_level.unwrap_or_else(|| default_log_level().to_string()),
            log_dir,
        })
    }

    /// Fails fast on settings that would only break after startup.
    pub fn validate(&self) -> Result<()> {
        if let DbTarget::File(path) = &self.database {
            anyhow::ensure!(
                !path.as_os_str().is_empty(),
                "database path must not be empty"
            );
        }

        if let Some(dir) = &self.log_dir {
            anyhow::ensure!(
                dir.is_absolute(),
                "log directory {:?} must be an absolute path",
                dir
            );
        }

        normalize_level(&self.log_level).map_err(anyhow::Error::msg)?;
        Ok(())
    }
}
