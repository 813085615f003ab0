//! Credentials Entity
//!
//! What the credential store persists between runs: the access token,
//! the refresh token when the backend issued one, and the access token's
//! expiry computed from `expires_in`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::token::{AccessToken, RefreshToken};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: AccessToken,
    #[serde(default)]
    pub refresh_token: Option<RefreshToken>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn new(access_token: AccessToken) -> Self {
        Self {
            access_token,
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: Option<RefreshToken>) -> Self {
        self.refresh_token = refresh_token.filter(|t| !t.is_blank());
        self
    }

    /// Set expiry relative to `now` from the backend's `expires_in` (seconds)
    ///
    /// A lifetime past the representable date range is treated as unknown.
    pub fn expiring_in(mut self, expires_in_secs: Option<i64>, now: DateTime<Utc>) -> Self {
        self.expires_at = expires_in_secs
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime));
        if self.expires_at.is_none()
            && let Some(secs) = expires_in_secs.filter(|secs| *secs > 0)
        {
            tracing::debug!(expires_in = secs, "Token lifetime out of range, expiry unknown");
        }
        self
    }

    /// Access token is expired, or will be within `leeway`
    ///
    /// Credentials without a known expiry never need a refresh; the
    /// backend answers 401 once they stop working.
    pub fn needs_refresh(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
        self.expires_at.is_some_and(|expires_at| {
            match expires_at.checked_sub_signed(leeway) {
                Some(refresh_at) => refresh_at <= now,
                // Underflow only happens near the earliest date, long expired
                None => leeway > Duration::zero(),
            }
        })
    }

    /// Keep the previous refresh token when a rotation response omits one
    pub fn inherit_refresh_token(mut self, previous: &Credentials) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.refresh_token.clone();
        }
        self
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Seconds until expiry, clamped at zero
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at
            .map(|expires_at| (expires_at - now).num_seconds().max(0))
    }
}
