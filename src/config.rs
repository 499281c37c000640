//! Configuration for the hub
//!
//! CLI arguments and environment variable handling using clap. Every flag
//! can also be set from the environment or a `.env` file.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

use crate::db::StoreBackend;
use crate::types::{HubError, Result};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Pretty,
    /// One JSON object per line
    Json,
}

/// Community Hub - REST API for courses, events, resources and member profiles
#[derive(Parser, Debug, Clone)]
#[command(name = "community-hub")]
#[command(about = "REST API for the community support hub")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "community_hub")]
    pub mongodb_db: String,

    /// Storage backend (mongo or memory)
    #[arg(long, env = "STORE_BACKEND", default_value = "mongo")]
    pub store_backend: StoreBackend,

    /// Development mode: fall back to the in-memory store when MongoDB
    /// cannot be reached
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Key required for catalog changes and /api/admin (open when unset)
    #[arg(long, env = "ADMIN_API_KEY")]
    pub admin_api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Largest accepted request body in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "1048576")]
    pub max_body_bytes: usize,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.mongodb_db.trim().is_empty() {
            return Err(HubError::Config("MONGODB_DB must not be empty".to_string()));
        }

        if self.max_body_bytes == 0 {
            return Err(HubError::Config(
                "MAX_BODY_BYTES must be greater than zero".to_string(),
            ));
        }

        if !self.dev_mode && self.admin_api_key.as_deref() == Some("") {
            return Err(HubError::Config("ADMIN_API_KEY is set but empty".to_string()));
        }

        Ok(())
    }
}
