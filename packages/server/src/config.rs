use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::kernel::workflow_feed::DEFAULT_FEED_CAPACITY;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub workflow_feed_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            workflow_feed_capacity: env::var("WORKFLOW_FEED_CAPACITY")
                .unwrap_or_else(|_| DEFAULT_FEED_CAPACITY.to_string())
                .parse()
                .context("WORKFLOW_FEED_CAPACITY must be a valid number")?,
        })
    }
}
