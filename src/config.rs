//! Configuration types for the AbuseIPDB client.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default AbuseIPDB v2 endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.abuseipdb.com/api/v2";

/// Largest lookback window the check endpoint accepts.
pub const MAX_LOOKBACK_DAYS: u32 = 365;

/// Root configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// AbuseIPDB client settings.
    pub abuseipdb: ClientConfig,

    /// In-memory cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Settings for a [`ReputationClient`](crate::ReputationClient).
///
/// Build one with [`ClientConfig::new`] and adjust it through the setters.
/// Setters that can fail validate eagerly and leave the previous value in
/// place on error.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// API key (supports ${ENV_VAR} syntax in config files).
    pub(crate) api_key: String,

    /// Base URL the endpoint names are appended to.
    #[serde(default = "default_api_base_url")]
    pub(crate) api_base_url: String,

    /// Only consider reports from the last N days.
    #[serde(default = "default_lookback_days")]
    pub(crate) lookback_days: u32,

    /// How long a check result stays cached.
    #[serde(default = "default_cache_ttl")]
    pub(crate) cache_ttl_seconds: u64,

    /// Scores at or above this value are spam.
    #[serde(default = "default_spam_threshold")]
    pub(crate) spam_threshold: u8,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub(crate) timeout_ms: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_lookback_days() -> u32 {
    30
}

fn default_cache_ttl() -> u64 {
    10
}

fn default_spam_threshold() -> u8 {
    100
}

fn default_timeout() -> u64 {
    5000
}

impl ClientConfig {
    /// Create a configuration with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: default_api_base_url(),
            lookback_days: default_lookback_days(),
            cache_ttl_seconds: default_cache_ttl(),
            spam_threshold: default_spam_threshold(),
            timeout_ms: default_timeout(),
        }
    }

    /// API key sent in the `Key` header.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Base URL the endpoint names are appended to.
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Lookback window in days, sent as `maxAgeInDays`.
    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// How long a check result stays cached.
    pub fn cache_ttl_seconds(&self) -> u64 {
        self.cache_ttl_seconds
    }

    /// Scores at or above this value are spam.
    pub fn spam_threshold(&self) -> u8 {
        self.spam_threshold
    }

    /// HTTP request timeout in milliseconds.
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Set the API key. Must not be blank.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<(), ClientError> {
        let api_key = api_key.into();
        validate_api_key(&api_key)?;
        self.api_key = api_key;
        Ok(())
    }

    /// Set the base URL. Must be an absolute URL with a host.
    pub fn set_api_base_url(&mut self, url: &str) -> Result<(), ClientError> {
        validate_base_url(url)?;
        self.api_base_url = url.to_string();
        Ok(())
    }

    /// Set the lookback window. Must be between 1 and 365 days.
    pub fn set_lookback_days(&mut self, days: u32) -> Result<(), ClientError> {
        validate_lookback_days(days)?;
        self.lookback_days = days;
        Ok(())
    }

    /// Set the cache TTL. Zero disables caching.
    pub fn set_cache_ttl_seconds(&mut self, ttl: u64) {
        self.cache_ttl_seconds = ttl;
    }

    /// Set the spam threshold. Must be at most 100.
    pub fn set_spam_threshold(&mut self, threshold: u8) -> Result<(), ClientError> {
        validate_spam_threshold(threshold)?;
        self.spam_threshold = threshold;
        Ok(())
    }

    /// Set the HTTP request timeout.
    pub fn set_timeout_ms(&mut self, timeout_ms: u64) {
        self.timeout_ms = timeout_ms;
    }

    /// Validate every field. Used for configurations that bypassed the
    /// setters, e.g. ones deserialized from a file.
    pub fn validate(&self) -> Result<(), ClientError> {
        validate_api_key(&self.api_key)?;
        validate_base_url(&self.api_base_url)?;
        validate_lookback_days(self.lookback_days)?;
        validate_spam_threshold(self.spam_threshold)?;
        Ok(())
    }
}

fn validate_api_key(api_key: &str) -> Result<(), ClientError> {
    if api_key.trim().is_empty() {
        return Err(ClientError::config("api_key is empty"));
    }
    Ok(())
}

fn validate_base_url(url: &str) -> Result<(), ClientError> {
    match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => Ok(()),
        Ok(_) => Err(ClientError::config(format!("api_base_url has no host: {url}"))),
        Err(e) => Err(ClientError::config(format!("malformed api_base_url '{url}': {e}"))),
    }
}

fn validate_lookback_days(days: u32) -> Result<(), ClientError> {
    if days == 0 || days > MAX_LOOKBACK_DAYS {
        return Err(ClientError::config(format!(
            "lookback_days ({days}) must be between 1 and {MAX_LOOKBACK_DAYS}"
        )));
    }
    Ok(())
}

fn validate_spam_threshold(threshold: u8) -> Result<(), ClientError> {
    if threshold > 100 {
        return Err(ClientError::config(format!("spam_threshold ({threshold}) must be <= 100")));
    }
    Ok(())
}

/// In-memory cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum number of cached check results.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

fn default_max_entries() -> usize {
    10_000
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text, expanding ${VAR} references first.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let expanded = expand_env_vars(content);
        let config: Config = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.abuseipdb.validate()?;

        if self.cache.max_entries == 0 {
            anyhow::bail!("cache.max_entries must be > 0");
        }

        Ok(())
    }

    /// Generate example configuration YAML.
    pub fn example() -> String {
        r#"# AbuseIPDB client configuration

abuseipdb:
  api_key: "${ABUSEIPDB_API_KEY}"    # Use environment variable
  api_base_url: "https://api.abuseipdb.com/api/v2"
  lookback_days: 30                  # Only consider reports from last 30 days
  cache_ttl_seconds: 10              # Cache check results for 10 seconds
  spam_threshold: 100                # Spam if score >= 100
  timeout_ms: 5000                   # API timeout

cache:
  max_entries: 10000
"#
        .to_string()
    }
}

/// Expand environment variables in the format ${VAR_NAME}.
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static pattern");

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let var_value = std::env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}
