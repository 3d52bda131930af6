//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::Parser;
use lexisync_sync::SyncConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "lexisync-server")]
#[command(about = "Vocabulary sync server for lexisync readers")]
pub struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, env = "LEXISYNC_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "LEXISYNC_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Path to the SQLite database file
    #[arg(short, long, env = "LEXISYNC_DATABASE", default_value = "lexisync.sqlite3")]
    pub database: PathBuf,

    /// Largest number of records accepted in one sync call (unlimited if unset)
    #[arg(long, env = "LEXISYNC_MAX_BATCH_SIZE")]
    pub max_batch_size: Option<usize>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            max_batch_size: self.max_batch_size,
        }
    }

    /// Log filter used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
