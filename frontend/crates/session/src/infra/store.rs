//! Credential Stores
//!
//! - [`MemoryCredentialStore`]: process lifetime only
//! - [`CookieCredentialStore`]: cookies in the HTTP client's jar
//! - [`FileCredentialStore`]: JSON file, survives restarts

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::DateTime;
use platform::cookie::{CookieConfig, extract_cookie};
use reqwest::Url;
use reqwest::cookie::{CookieStore as _, Jar};
use tokio::sync::RwLock;

use crate::application::config::GateConfig;
use crate::domain::entity::credentials::Credentials;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::token::{AccessToken, RefreshToken};
use crate::error::{GateError, GateResult};

// =============================================================================
// Memory
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            slot: RwLock::new(Some(credentials)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> GateResult<Option<Credentials>> {
        Ok(self.slot.read().await.clone())
    }

    async fn save(&self, credentials: &Credentials) -> GateResult<()> {
        *self.slot.write().await = Some(credentials.clone());
        Ok(())
    }

    async fn clear(&self) -> GateResult<()> {
        *self.slot.write().await = None;
        Ok(())
    }
}

// =============================================================================
// Cookie jar
// =============================================================================

/// Keeps the credentials as cookies scoped to the Auth API origin
///
/// The jar is the one the HTTP client sends from, so the backend sees the
/// token cookie on every request just as it would from a browser. The
/// refresh token and expiry ride in companion cookies named
/// `<key>_refresh` and `<key>_expires`.
pub struct CookieCredentialStore {
    jar: Arc<Jar>,
    url: Url,
    access: CookieConfig,
    refresh: CookieConfig,
    expires: CookieConfig,
}

impl CookieCredentialStore {
    pub fn new(jar: Arc<Jar>, config: &GateConfig) -> GateResult<Self> {
        let url = Url::parse(&config.api_base_url)
            .map_err(|e| GateError::Internal(format!("Invalid auth API URL: {e}")))?;
        let access = config.cookie();
        let refresh = access.renamed(format!("{}_refresh", access.name));
        let expires = access.renamed(format!("{}_expires", access.name));

        Ok(Self {
            jar,
            url,
            access,
            refresh,
            expires,
        })
    }

    pub fn jar(&self) -> Arc<Jar> {
        self.jar.clone()
    }

    fn set(&self, cookie: &CookieConfig, value: &str) {
        self.jar.add_cookie_str(&cookie.build_set_cookie(value), &self.url);
    }

    fn remove(&self, cookie: &CookieConfig) {
        self.jar.add_cookie_str(&cookie.build_delete_cookie(), &self.url);
    }
}

impl CredentialStore for CookieCredentialStore {
    async fn load(&self) -> GateResult<Option<Credentials>> {
        let Some(header) = self.jar.cookies(&self.url) else {
            return Ok(None);
        };
        let header = header
            .to_str()
            .map_err(|e| GateError::Storage(format!("Unreadable cookie header: {e}")))?;

        let Some(access_token) = extract_cookie(header, &self.access.name) else {
            return Ok(None);
        };

        let refresh_token = extract_cookie(header, &self.refresh.name).map(RefreshToken::new);
        let expires_at = extract_cookie(header, &self.expires.name)
            .and_then(|secs| secs.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        Ok(Some(Credentials {
            access_token: AccessToken::new(access_token),
            refresh_token,
            expires_at,
        }))
    }

    async fn save(&self, credentials: &Credentials) -> GateResult<()> {
        self.set(&self.access, credentials.access_token.expose());

        match &credentials.refresh_token {
            Some(refresh_token) => self.set(&self.refresh, refresh_token.expose()),
            None => self.remove(&self.refresh),
        }

        match credentials.expires_at {
            Some(expires_at) => self.set(&self.expires, &expires_at.timestamp().to_string()),
            None => self.remove(&self.expires),
        }

        tracing::debug!(cookie = %self.access.name, "Credentials stored in cookie jar");
        Ok(())
    }

    async fn clear(&self) -> GateResult<()> {
        self.remove(&self.access);
        self.remove(&self.refresh);
        self.remove(&self.expires);
        Ok(())
    }
}

// =============================================================================
// File
// =============================================================================

/// JSON file holding one [`Credentials`] record
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, action: &str, err: impl std::fmt::Display) -> GateError {
        GateError::Storage(format!("{action} {}: {err}", self.path.display()))
    }
}

impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> GateResult<Option<Credentials>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.storage_error("Failed to read", e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| self.storage_error("Corrupt credentials in", e))
    }

    async fn save(&self, credentials: &Credentials) -> GateResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.storage_error("Failed to create directory for", e))?;
        }

        let json = serde_json::to_vec_pretty(credentials)
            .map_err(|e| GateError::Internal(e.to_string()))?;

        // Atomic replace: readers see the old record or the new one.
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.storage_error("Failed to write", e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.storage_error("Failed to replace", e))?;

        Ok(())
    }

    async fn clear(&self) -> GateResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.storage_error("Failed to remove", e)),
        }
    }
}
