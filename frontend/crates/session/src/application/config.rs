//! Gate Configuration
//!
//! Configuration for the session gate and its default collaborators.

use std::env;
use std::time::Duration;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;
use platform::cookie::CookieConfig;

#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Auth API base URL, including the version prefix
    pub api_base_url: String,
    /// Fixed name under which the token is persisted (cookie name / key)
    pub credential_key: String,
    /// Where unauthenticated visitors are sent
    pub login_route: String,
    /// Query parameter carrying the originally requested path
    pub return_to_param: String,
    /// Whole-request timeout for Auth API calls
    pub request_timeout: Duration,
    /// Refresh a stored access token this long before it expires
    pub refresh_leeway: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api/v1".to_string(),
            credential_key: "auth_token".to_string(),
            login_route: "/login".to_string(),
            return_to_param: "next".to_string(),
            request_timeout: Duration::from_secs(15),
            refresh_leeway: Duration::from_secs(30),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
        }
    }
}

impl GateConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Default::default()
        }
    }

    /// Read `GATE_*` variables, falling back to defaults for anything unset
    /// or unparseable.
    pub fn from_env() -> Self {
        let base = if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::default()
        };

        Self {
            api_base_url: env_string("GATE_API_URL").unwrap_or(base.api_base_url),
            credential_key: env_string("GATE_CREDENTIAL_KEY").unwrap_or(base.credential_key),
            login_route: env_string("GATE_LOGIN_ROUTE").unwrap_or(base.login_route),
            return_to_param: env_string("GATE_RETURN_TO_PARAM").unwrap_or(base.return_to_param),
            request_timeout: env_secs("GATE_REQUEST_TIMEOUT_SECS").unwrap_or(base.request_timeout),
            refresh_leeway: env_secs("GATE_REFRESH_LEEWAY_SECS").unwrap_or(base.refresh_leeway),
            cookie_secure: env_string("GATE_COOKIE_SECURE")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(base.cookie_secure),
            cookie_same_site: env_string("GATE_COOKIE_SAME_SITE")
                .map(|v| SameSite::from_str_lossy(&v))
                .unwrap_or(base.cookie_same_site),
        }
    }

    /// Cookie settings for the persisted access token
    pub fn cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.credential_key.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: None,
        }
    }

    pub fn refresh_leeway_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.refresh_leeway).unwrap_or_else(|_| chrono::Duration::zero())
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_secs(key: &str) -> Option<Duration> {
    env_string(key)?.trim().parse::<u64>().ok().map(Duration::from_secs)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
