//! HTTP client construction
//!
//! Every outbound call to the backend goes through a `reqwest::Client`
//! built here, so timeouts, the user agent and the cookie jar are set in
//! one place.

use reqwest::cookie::Jar;
use std::sync::Arc;
use std::time::Duration;

/// Default User-Agent sent to the backend
pub const DEFAULT_USER_AGENT: &str = concat!("gigerly-client/", env!("CARGO_PKG_VERSION"));

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpClientConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            connect_timeout: timeout.min(Duration::from_secs(5)),
            ..Default::default()
        }
    }
}

/// Error when building an HTTP client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Build a client, optionally attached to a shared cookie jar
///
/// When a jar is given, cookies stored in it are sent automatically with
/// every matching request, so callers never set the header themselves.
pub fn build_client(
    config: &HttpClientConfig,
    jar: Option<Arc<Jar>>,
) -> Result<reqwest::Client, ClientError> {
    let mut builder = reqwest::Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.clone());

    if let Some(jar) = jar {
        builder = builder.cookie_provider(jar);
    }

    let client = builder.build()?;

    tracing::debug!(
        timeout_ms = config.timeout.as_millis() as u64,
        user_agent = %config.user_agent,
        "HTTP client built"
    );

    Ok(client)
}

/// `Authorization` header value for a bearer token
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
