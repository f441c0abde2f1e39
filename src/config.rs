//! Runtime configuration read from the environment
//!
//! `dotenvy` loads a `.env` file (if present) before `AppConfig::from_env`
//! runs, so every value below can come from either source.

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::logger::{LogSettings, Stack, DEFAULT_LOG_ENDPOINT};
use crate::store::DEFAULT_CAPACITY;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to listen on
    pub port: u16,

    /// Public base URL used when generating short links, without a trailing
    /// slash (e.g., "https://go.example.com")
    pub base_url: String,

    /// Maximum number of short URLs held at once
    pub max_urls: usize,

    /// Remote log settings; its `Debug` output redacts the credentials
    pub log: LogSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var_or("PORT", "8080")
            .parse::<u16>()
            .context("PORT must be a valid port number (1-65535)")?;

        let base_url = lookup("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_owned();

        let max_urls = var_or("MAX_URLS", &DEFAULT_CAPACITY.to_string())
            .parse::<usize>()
            .context("MAX_URLS must be a non-negative integer")?;
        if max_urls == 0 {
            bail!("MAX_URLS must be at least 1");
        }

        let timeout_ms = var_or("LOG_TIMEOUT_MS", "5000")
            .parse::<u64>()
            .context("LOG_TIMEOUT_MS must be a number of milliseconds")?;
        if timeout_ms == 0 {
            bail!("LOG_TIMEOUT_MS must be at least 1");
        }

        let stack = match var_or("LOG_STACK", "backend").to_ascii_lowercase().as_str() {
            "backend" => Stack::Backend,
            "frontend" => Stack::Frontend,
            other => bail!("LOG_STACK must be 'backend' or 'frontend', got '{other}'"),
        };

        // An explicitly empty LOG_ENDPOINT turns remote shipping off.
        let endpoint = Some(var_or("LOG_ENDPOINT", DEFAULT_LOG_ENDPOINT))
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty());

        Ok(Self {
            port,
            base_url,
            max_urls,
            log: LogSettings {
                endpoint,
                auth_token: var_or("LOG_AUTH_TOKEN", ""),
                client_id: var_or("LOG_CLIENT_ID", ""),
                client_secret: var_or("LOG_CLIENT_SECRET", ""),
                timeout: Duration::from_millis(timeout_ms),
                stack,
            },
        })
    }
}
