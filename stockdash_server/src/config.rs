use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Runtime configuration. Every flag falls back to an environment variable,
/// which may come from a `.env` file.
#[derive(Debug, Clone, Parser)]
#[command(name = "stockdash")]
#[command(about = "Serve historical stock prices and a naive next-close prediction")]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    /// SQLite cache file; parent directories are created on startup
    #[arg(long, env = "STOCKDASH_DB", default_value = "data/stocks.sqlite")]
    pub db_path: PathBuf,

    /// Directory holding `{SYMBOL}_sample.json` datasets
    #[arg(long, env = "STOCKDASH_SAMPLE_DIR", default_value = "sample")]
    pub sample_dir: PathBuf,

    /// Built client assets served for every non-API path
    #[arg(long, env = "STOCKDASH_STATIC_DIR", default_value = "client/dist")]
    pub static_dir: PathBuf,

    /// Allowed CORS origin; any origin is allowed when unset
    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    #[arg(long, env = "STOCKDASH_CHART_URL", default_value = "https://query1.finance.yahoo.com")]
    pub chart_base_url: String,

    #[arg(long, env = "STOCKDASH_CSV_URL", default_value = "https://stooq.com")]
    pub csv_base_url: String,

    /// Per-request timeout for upstream providers, in seconds
    #[arg(long, env = "STOCKDASH_PROVIDER_TIMEOUT_SECS", default_value_t = 15)]
    pub provider_timeout_secs: u64,
}

impl Config {
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address {addr}: {e}"))
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}
