//! Auth API Wire Types
//!
//! Request and response bodies exchanged with the backend's `/auth`
//! routes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{credentials::Credentials, user::User};
use crate::domain::repository::{AuthGrant, Registration};
use crate::domain::value_object::token::{AccessToken, RefreshToken};
use crate::domain::value_object::user_role::UserRole;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
pub struct GoogleLoginRequest<'a> {
    pub google_token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

// =============================================================================
// Responses
// =============================================================================

/// Body of login, Google sign-in and refresh responses
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: AccessToken,
    #[serde(default)]
    pub refresh_token: Option<RefreshToken>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub user: Option<User>,
}

impl TokenResponse {
    pub fn into_grant(self, received_at: DateTime<Utc>) -> AuthGrant {
        if let Some(token_type) = self.token_type.as_deref()
            && !token_type.eq_ignore_ascii_case("bearer")
        {
            tracing::debug!(token_type, "Unexpected token type");
        }

        let credentials = Credentials::new(self.access_token)
            .with_refresh_token(self.refresh_token)
            .expiring_in(self.expires_in, received_at);

        AuthGrant {
            credentials,
            user: self.user,
        }
    }
}

/// `/auth/register` answers with tokens or with just the new user
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RegisterResponse {
    Tokens(TokenResponse),
    Created(User),
}

impl RegisterResponse {
    pub fn into_registration(self, received_at: DateTime<Utc>) -> Registration {
        match self {
            RegisterResponse::Tokens(tokens) => Registration::Granted(tokens.into_grant(received_at)),
            RegisterResponse::Created(user) => Registration::Created(user),
        }
    }
}

/// Error body
///
/// Either the backend's own envelope (`{"error", "message", "code"}`) or
/// the framework default (`{"detail": ...}`).
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Best human-readable message the body carries
    pub fn message(&self) -> Option<String> {
        if let Some(message) = self.message.as_deref().filter(|m| !m.trim().is_empty()) {
            return Some(message.to_string());
        }

        match self.detail.as_ref()? {
            serde_json::Value::String(detail) => Some(detail.clone()),
            // Validation failures: [{"loc": [...], "msg": "...", ...}, ...]
            serde_json::Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            _ => None,
        }
    }
}
