//! Configuration management for the loan console
//!
//! This module handles loading and validating configuration from environment variables,
//! with support for different environments (development, staging, production).

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default reserved super-admin address used by the backend seed data
pub const DEFAULT_SUPER_ADMIN_EMAIL: &str = "admin@loanapp.com";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid API base URL: {0}")]
    InvalidUrl(String),
}

/// Application environment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse environment from string
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Get the environment name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the loan backend (scheme + host + port, no trailing slash)
    pub api_base_url: String,

    /// Current environment
    pub environment: Environment,

    /// Log level (RUST_LOG)
    pub log_level: String,

    /// Reserved super-admin address
    pub super_admin_email: String,

    /// Dashboard polling interval
    pub dashboard_refresh: Duration,

    /// Rows per page for loan tables
    pub page_size: u32,

    /// Where the session token and convenience keys are persisted
    pub session_file: PathBuf,

    /// Output directory for exported reports
    pub report_dir: PathBuf,

    /// Maximum status history entries rendered in a report
    pub report_history_limit: usize,

    /// Optional per-request timeout. None keeps requests unbounded.
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            environment: Environment::Development,
            log_level: "info".to_string(),
            super_admin_email: DEFAULT_SUPER_ADMIN_EMAIL.to_string(),
            dashboard_refresh: Duration::from_secs(300),
            page_size: 10,
            session_file: PathBuf::from(".loan-console/session.json"),
            report_dir: PathBuf::from("reports"),
            report_history_limit: 10,
            request_timeout: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let environment = lookup("ENVIRONMENT")
            .map(|s| Environment::from_str(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let api_base_url = lookup("API_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(format!(
                "API_BASE_URL must start with http:// or https://, got '{}'",
                api_base_url
            )));
        }

        // Bearer tokens ride on every call
        if environment.is_production() && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(format!(
                "API_BASE_URL must use https:// in production, got '{}'",
                api_base_url
            )));
        }

        let log_level = lookup("RUST_LOG").unwrap_or(defaults.log_level);

        let super_admin_email = lookup("SUPER_ADMIN_EMAIL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.super_admin_email);

        let dashboard_refresh = lookup("DASHBOARD_REFRESH_SECS")
            .map(|s| parse_number::<u64>("DASHBOARD_REFRESH_SECS", &s))
            .transpose()?
            .map(Duration::from_secs)
            .unwrap_or(defaults.dashboard_refresh);

        let page_size = lookup("PAGE_SIZE")
            .map(|s| parse_number::<u32>("PAGE_SIZE", &s))
            .transpose()?
            .unwrap_or(defaults.page_size);

        if page_size == 0 {
            return Err(ConfigError::InvalidValue(
                "PAGE_SIZE must be greater than 0".to_string(),
            ));
        }

        let session_file = lookup("SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.session_file);

        let report_dir = lookup("REPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.report_dir);

        let report_history_limit = lookup("REPORT_HISTORY_LIMIT")
            .map(|s| parse_number::<usize>("REPORT_HISTORY_LIMIT", &s))
            .transpose()?
            .unwrap_or(defaults.report_history_limit);

        let request_timeout = lookup("REQUEST_TIMEOUT_SECS")
            .map(|s| parse_number::<u64>("REQUEST_TIMEOUT_SECS", &s))
            .transpose()?
            .map(Duration::from_secs);

        Ok(Config {
            api_base_url,
            environment,
            log_level,
            super_admin_email,
            dashboard_refresh,
            page_size,
            session_file,
            report_dir,
            report_history_limit,
            request_timeout,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(format!("{} must be a valid number", key)))
}
