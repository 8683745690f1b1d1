use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;
use url::Url;

/// Default API host used when `WALLET_API_BASE` is not set.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Route prefix every backend endpoint lives under.
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Header carrying the admin credential. Never sent together with `Authorization`.
pub const DEFAULT_ADMIN_HEADER: &str = "X-Admin-Token";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// How long a toast stays on screen before it is dismissed.
pub const DEFAULT_TOAST_MS: u64 = 3200;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: Url,
    pub api_prefix: String,
    pub request_timeout: Duration,
    pub admin_header: String,
    pub toast_duration: Duration,
}

impl Config {
    /// Build a config for the given API base, with every other knob at its default.
    ///
    /// Only `http`/`https` URLs that can carry a path are accepted.
    pub fn new(api_base: &str) -> Result<Self> {
        Ok(Self {
            api_base: parse_api_base(api_base)?,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            admin_header: DEFAULT_ADMIN_HEADER.to_string(),
            toast_duration: Duration::from_millis(DEFAULT_TOAST_MS),
        })
    }

    /// Read the config from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    /// Malformed optional values are logged and replaced by their defaults; a
    /// malformed `WALLET_API_BASE` is an error because nothing can work without it.
    pub fn from_env() -> Result<Self> {
        let base = env::var("WALLET_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let mut config = Self::new(&base)?;

        if let Ok(prefix) = env::var("WALLET_API_PREFIX") {
            config.api_prefix = prefix.trim().to_string();
        }
        if let Some(secs) = parse_env_u64("WALLET_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }
        if let Ok(header) = env::var("WALLET_ADMIN_HEADER") {
            if header.trim().is_empty() {
                tracing::warn!("WALLET_ADMIN_HEADER is empty, using {}", DEFAULT_ADMIN_HEADER);
            } else {
                config.admin_header = header.trim().to_string();
            }
        }
        if let Some(ms) = parse_env_u64("WALLET_TOAST_MS") {
            config.toast_duration = Duration::from_millis(ms);
        }

        tracing::info!(
            "API endpoint {}{} (timeout {}s)",
            config.api_base.as_str().trim_end_matches('/'),
            config.api_prefix,
            config.request_timeout.as_secs()
        );
        Ok(config)
    }

    /// Full URL for an endpoint given as raw path segments.
    ///
    /// Segments are percent-encoded individually, so user input such as an
    /// email or a block hash can never add or escape path components.
    pub fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Url {
        let mut url = self.api_base.clone();
        // api_base was validated as a base URL in `Config::new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for part in self.api_prefix.split('/').filter(|p| !p.is_empty()) {
                path.push(part);
            }
            for segment in segments {
                path.push(segment.as_ref());
            }
        }
        url
    }

    /// Display form of the API root, e.g. `http://127.0.0.1:8000/api/v1`.
    pub fn api_root(&self) -> String {
        self.endpoint::<&str>(&[]).to_string()
    }
}

fn parse_api_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| anyhow!("Invalid API base URL '{}': {}", raw, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("API base URL must use http or https, got '{}'", url.scheme()));
    }
    if url.cannot_be_a_base() {
        return Err(anyhow!("API base URL '{}' cannot carry a path", raw));
    }
    Ok(url)
}

fn parse_env_u64(key: &str) -> Option<u64> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Config::new tests ====================

    #[test]
    fn test_config_new_defaults() {
        let config = Config::new("http://localhost:9000").unwrap();
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.admin_header, "X-Admin-Token");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.toast_duration, Duration::from_millis(3200));
    }

    #[test]
    fn test_config_new_rejects_garbage() {
        assert!(Config::new("not a url").is_err());
    }

    #[test]
    fn test_config_new_rejects_non_http_scheme() {
        let err = Config::new("ftp://example.com").unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_config_new_rejects_cannot_be_a_base() {
        assert!(Config::new("mailto:someone@example.com").is_err());
    }

    // ==================== endpoint tests ====================

    #[test]
    fn test_endpoint_joins_prefix_and_segments() {
        let config = Config::new("http://localhost:8000").unwrap();
        let url = config.endpoint(&["users", "me"]);
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/users/me");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = Config::new("https://wallet.example.com/backend/").unwrap();
        let url = config.endpoint(&["tx", "history"]);
        assert_eq!(url.as_str(), "https://wallet.example.com/backend/api/v1/tx/history");
    }

    #[test]
    fn test_endpoint_encodes_user_input() {
        let config = Config::new("http://localhost:8000").unwrap();
        let url = config.endpoint(&["explorer", "tx", "a/b c"]);
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/explorer/tx/a%2Fb%20c");
    }

    #[test]
    fn test_endpoint_with_empty_prefix() {
        let mut config = Config::new("http://localhost:8000").unwrap();
        config.api_prefix = String::new();
        let url = config.endpoint(&["auth", "login"]);
        assert_eq!(url.as_str(), "http://localhost:8000/auth/login");
    }

    #[test]
    fn test_api_root() {
        let config = Config::new("http://localhost:8000").unwrap();
        assert_eq!(config.api_root(), "http://localhost:8000/api/v1");
    }
}
