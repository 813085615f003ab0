//! Infrastructure Layer
//!
//! Auth API client over HTTP and credential store implementations.

pub mod dto;
pub mod http;
pub mod store;

use std::sync::Arc;

use reqwest::cookie::Jar;

pub use http::HttpAuthApi;
pub use store::{CookieCredentialStore, FileCredentialStore, MemoryCredentialStore};

use crate::application::{config::GateConfig, gate::SessionGate};
use crate::error::GateResult;

/// Gate whose credentials live in the HTTP client's cookie jar
pub fn cookie_gate(config: GateConfig) -> GateResult<SessionGate<HttpAuthApi, CookieCredentialStore>> {
    let jar = Arc::new(Jar::default());
    let api = HttpAuthApi::new(&config, Some(jar.clone()))?;
    let store = CookieCredentialStore::new(jar, &config)?;
    Ok(SessionGate::new(api, store, config))
}

/// Gate whose credentials live in a JSON file
pub fn file_gate(
    config: GateConfig,
    path: impl Into<std::path::PathBuf>,
) -> GateResult<SessionGate<HttpAuthApi, FileCredentialStore>> {
    let api = HttpAuthApi::new(&config, None)?;
    Ok(SessionGate::new(api, FileCredentialStore::new(path), config))
}
