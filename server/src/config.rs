//! Command-line and environment configuration.
//!
//! Every flag falls back to an environment variable, so the service can be
//! configured entirely from the environment. A `.env` file in the working
//! directory (or any parent) is loaded first; variables already set in the
//! process environment win over it.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use keyledger_store::{SharedStore, SqliteLicenseStore, StoreResult};
use keyledger_types::SharedClock;
use thiserror::Error;

/// Loads variables from a `.env` file into the process environment.
///
/// With `None`, searches the working directory and its parents. Returns the
/// path that was loaded, or `None` if there was no usable file.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => dotenvy::from_path(path).ok().map(|()| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "keyledger-server")]
#[command(about = "License registry and validation service")]
pub struct Config {
    /// Address to bind the HTTP listener to
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// HTTP port
    #[arg(short, long, env = "PORT", default_value_t = 5001)]
    pub port: u16,

    /// SQLite database path, `sqlite://` URL, or `:memory:`
    #[arg(short, long, env = "DATABASE_URL", default_value = "licenses.db")]
    pub database: String,

    /// Upper bound on a single storage round-trip, in milliseconds
    #[arg(long, env = "STORAGE_TIMEOUT_MS", default_value_t = 5000)]
    pub storage_timeout_ms: u64,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }

    /// Resolves the `database` setting.
    pub fn database_target(&self) -> Result<DatabaseTarget, ConfigError> {
        DatabaseTarget::parse(&self.database)
    }

    /// Checks settings that clap cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.database_target().map(|_| ())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("database location is empty")]
    EmptyDatabase,

    #[error("unsupported database URL scheme: {0} (only sqlite is supported)")]
    UnsupportedScheme(String),

    #[error("storage timeout must be greater than zero")]
    ZeroTimeout,
}

/// Where licenses are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Memory,
    File(PathBuf),
}

impl DatabaseTarget {
    /// Parses a plain path, a `sqlite:`/`sqlite://` URL, or `:memory:`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        let location = if let Some(rest) = raw.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = raw.strip_prefix("sqlite:") {
            rest
        } else if let Some((scheme, _)) = raw.split_once("://") {
            return Err(ConfigError::UnsupportedScheme(scheme.to_string()));
        } else {
            raw
        };

        match location {
            "" => Err(ConfigError::EmptyDatabase),
            ":memory:" => Ok(Self::Memory),
            path => Ok(Self::File(PathBuf::from(path))),
        }
    }

    /// Opens the store, creating the schema if needed.
    pub fn open(&self, clock: SharedClock) -> StoreResult<SharedStore> {
        let store = match self {
            Self::Memory => SqliteLicenseStore::open_in_memory(clock)?,
            Self::File(path) => SqliteLicenseStore::open(path, clock)?,
        };
        Ok(Arc::new(store))
    }
}
