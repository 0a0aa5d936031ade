//! Configuration management

use std::str::FromStr;

use anyhow::{self, Context, Result};

use crate::defaults::{
    DEFAULT_CAPACITY, DEFAULT_DB_NAME, DEFAULT_OPTIMIZER_TIMEOUT_SECONDS, DEFAULT_SERVICE_TIME_MINUTES,
    DEFAULT_TIME_LIMIT_SECONDS, DEPOT_PREFIX,
};
use crate::services::optimizer::OptimizerConfig;
use crate::types::{DepotRule, OptimizeParams};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Optimization service URL (optional, falls back to the demo optimizer if unset)
    pub optimizer_url: Option<String>,

    /// Optimizer request timeout in seconds
    pub optimizer_timeout_secs: u64,

    /// Data set the optimizer loads stops from
    pub db_name: String,

    /// Default solver time limit in seconds
    pub time_limit: u64,

    /// Default seats per bus
    pub capacity: u32,

    /// Default dwell time per stop in minutes
    pub service_time: u64,

    /// Stop id prefix marking depots
    pub depot_prefix: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let optimizer_url = std::env::var("OPTIMIZER_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let depot_prefix = std::env::var("DEPOT_PREFIX").unwrap_or_else(|_| DEPOT_PREFIX.to_string());
        if depot_prefix.trim().is_empty() {
            anyhow::bail!("DEPOT_PREFIX must not be empty");
        }

        Ok(Self {
            optimizer_url,
            optimizer_timeout_secs: env_number("OPTIMIZER_TIMEOUT_SECS", DEFAULT_OPTIMIZER_TIMEOUT_SECONDS)?,
            db_name: std::env::var("DEFAULT_DB_NAME").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string()),
            time_limit: env_number("DEFAULT_TIME_LIMIT", DEFAULT_TIME_LIMIT_SECONDS)?,
            capacity: env_number("DEFAULT_CAPACITY", DEFAULT_CAPACITY)?,
            service_time: env_number("DEFAULT_SERVICE_TIME", DEFAULT_SERVICE_TIME_MINUTES)?,
            depot_prefix,
        })
    }

    /// HTTP client settings, `None` when no optimizer URL is configured
    pub fn optimizer(&self) -> Option<OptimizerConfig> {
        self.optimizer_url.as_ref().map(|url| OptimizerConfig {
            timeout_seconds: self.optimizer_timeout_secs,
            ..OptimizerConfig::new(url.as_str())
        })
    }

    pub fn params(&self) -> OptimizeParams {
        OptimizeParams {
            time_limit: self.time_limit,
            capacity: self.capacity,
            service_time: self.service_time,
            db_name: self.db_name.clone(),
        }
    }

    pub fn depot_rule(&self) -> DepotRule {
        DepotRule::new(self.depot_prefix.clone())
    }
}

/// Read a numeric variable, using `default` when it is unset
fn env_number<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a non-negative number (got '{}')", key, value)),
        Err(_) => Ok(default),
    }
}
