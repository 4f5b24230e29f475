use std::path::PathBuf;
use std::time::Duration;

/// Order core configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | Working directory (cart snapshot, logs) |
/// | API_BASE_URL | http://localhost:3000/api | Order backend base URL |
/// | API_TOKEN | (unset) | Bearer token for the order backend |
/// | REQUEST_TIMEOUT_MS | 15000 | Per-request timeout (ms) |
/// | ENVIRONMENT | development | development / staging / production |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/storefront API_BASE_URL=https://api.example.com cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the cart database and logs
    pub work_dir: String,
    /// Order backend base URL
    pub api_base_url: String,
    /// Bearer token forwarded with every backend call
    pub api_token: Option<String>,
    /// Request timeout (ms); exceeding it surfaces as a retryable failure
    pub request_timeout_ms: u64,
    /// development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            api_base_url: std::env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/api".into()),
            api_token: std::env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(15000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override selected values (tests)
    pub fn with_overrides(work_dir: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.api_base_url = api_base_url.into();
        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Cart database path: `{work_dir}/cart.redb`
    pub fn cart_db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("cart.redb")
    }

    /// Log directory: `{work_dir}/logs`
    pub fn log_dir(&self) -> String {
        PathBuf::from(&self.work_dir)
            .join("logs")
            .to_string_lossy()
            .into_owned()
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
