use std::env;
use std::time::Duration;
use anyhow::Context;
use crate::backend::Credential;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub max_upload_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_token: None,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Read `.env` if there is one, then the process environment.
    pub fn load() -> anyhow::Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e).context("Failed to read .env");
            }
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup("AO_API_BASE_URL").unwrap_or(defaults.api_base_url);
        let api_token = lookup("AO_API_TOKEN").filter(|t| !t.trim().is_empty());

        let poll_interval = parse_number(&lookup, "AO_POLL_INTERVAL_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);
        let request_timeout = parse_number(&lookup, "AO_REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        let max_upload_bytes = parse_number(&lookup, "AO_MAX_UPLOAD_BYTES")?
            .unwrap_or(defaults.max_upload_bytes);

        if poll_interval.is_zero() {
            anyhow::bail!("AO_POLL_INTERVAL_MS must be greater than zero");
        }

        Ok(Self {
            api_base_url,
            api_token,
            poll_interval,
            request_timeout,
            max_upload_bytes,
        })
    }

    pub fn credential(&self) -> Option<Credential> {
        self.api_token.clone().and_then(Credential::new)
    }
}

fn parse_number<F>(lookup: &F, key: &str) -> anyhow::Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .with_context(|| format!("{key} must be a number, got {raw:?}"))
        })
        .transpose()
}
