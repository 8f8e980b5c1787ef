use std::env;
use std::net::SocketAddr;
use anyhow::{Context, Result};

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The origin the admin/student UI is served from (for CORS).
    pub ui_origin: String,
    /// How often the enrollment expiry sweep runs, in seconds.
    pub expiry_sweep_secs: u64,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            ui_origin: env::var("UI_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            expiry_sweep_secs: env::var("EXPIRY_SWEEP_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .context("Invalid EXPIRY_SWEEP_SECS")?,
        })
    }
}
