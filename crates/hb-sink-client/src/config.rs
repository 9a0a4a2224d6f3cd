//! Registration sink client configuration.
//!
//! The sink is a hosted Postgres table exposed over a REST interface. The
//! client needs the project base URL, an API key, and the table name.

use url::Url;
use zeroize::Zeroizing;

/// Default table holding regional registrations.
pub const DEFAULT_TABLE: &str = "regional_registrations";

/// Default request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;

/// Configuration for connecting to the registration sink.
///
/// Custom `Debug` implementation redacts the `api_key` field to prevent
/// credential leakage in log output. The key is zeroed on drop.
#[derive(Clone)]
pub struct SinkConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    pub base_url: Url,
    /// Anonymous API key, sent as `apikey` and as a bearer token.
    pub api_key: Zeroizing<String>,
    /// Target table.
    pub table: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for SinkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("table", &self.table)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SinkConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `HB_SINK_URL` (required)
    /// - `HB_SINK_API_KEY` (required)
    /// - `HB_SINK_TABLE` (default: `regional_registrations`)
    /// - `HB_SINK_TIMEOUT_SECS` (default: 8)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = std::env::var("HB_SINK_URL").map_err(|_| ConfigError::MissingUrl)?;
        let api_key = std::env::var("HB_SINK_API_KEY").map_err(|_| ConfigError::MissingApiKey)?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        Ok(Self {
            base_url: parse_url("HB_SINK_URL", &raw_url)?,
            api_key: Zeroizing::new(api_key),
            table: std::env::var("HB_SINK_TABLE")
                .ok()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            timeout_secs: std::env::var("HB_SINK_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&s: &u64| s > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Create a configuration pointing to a local mock server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be parsed.
    pub fn local_mock(port: u16, api_key: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("localhost", &format!("http://127.0.0.1:{port}"))?,
            api_key: Zeroizing::new(api_key.to_string()),
            table: DEFAULT_TABLE.to_string(),
            timeout_secs: 5,
        })
    }

    /// Full insert endpoint: `{base}/rest/v1/{table}`.
    pub fn insert_url(&self) -> Result<Url, ConfigError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        parse_url("insert", &format!("{base}/rest/v1/{}", self.table))
    }
}

fn parse_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(
            var.to_string(),
            format!("unsupported scheme \"{other}\""),
        )),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("HB_SINK_URL environment variable is required")]
    MissingUrl,
    #[error("HB_SINK_API_KEY environment variable is required")]
    MissingApiKey,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
