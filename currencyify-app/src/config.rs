//! Configuration loading from environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

const DEFAULT_REDIS_PORT: &str = "6379";

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    /// Rate provider endpoint. Unset means the static development table.
    pub fx_rates_api_url: Option<String>,
    pub fx_rates_api_timeout: Duration,
    /// Reference set of currency codes. Unset means the bundled list.
    pub currency_codes_file: Option<PathBuf>,
    pub cache_url: String,
    pub cache_ttl: Duration,
    pub cache_timeout: Duration,
    pub request_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = parse_var(&var, "PORT", 3000)?;
        let fx_rates_api_timeout = Duration::from_secs(parse_var(&var, "FX_RATES_API_TIMEOUT_SECS", 10)?);
        let cache_ttl = Duration::from_secs(parse_var(&var, "REDIS_DEFAULT_EXPIRY", 3600)?);
        let cache_timeout = Duration::from_millis(parse_var(&var, "CACHE_TIMEOUT_MS", 500)?);
        let request_timeout = Duration::from_secs(parse_var(&var, "REQUEST_TIMEOUT_SECS", 30)?);

        if cache_ttl.is_zero() {
            anyhow::bail!("REDIS_DEFAULT_EXPIRY must be at least 1 second");
        }

        // Legacy deployments configure Redis through host and port.
        let cache_url = match (var("CACHE_URL"), var("REDIS_HOST")) {
            (Some(url), _) => url,
            (None, Some(host)) => {
                let port = var("REDIS_PORT").unwrap_or_else(|| DEFAULT_REDIS_PORT.to_string());
                format!("redis://{host}:{port}")
            }
            (None, None) => "memory://".to_string(),
        };

        Ok(Self {
            port,
            fx_rates_api_url: var("FX_RATES_API_URL"),
            fx_rates_api_timeout,
            currency_codes_file: var("CURRENCY_CODES_FILE")
                .or_else(|| var("CURRENCY_CODES_JSON_FILE_NAME"))
                .map(PathBuf::from),
            cache_url,
            cache_ttl,
            cache_timeout,
            request_timeout,
        })
    }
}

fn parse_var<T>(var: impl Fn(&str) -> Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
