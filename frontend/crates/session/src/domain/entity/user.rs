//! User Entity
//!
//! The current user as returned by `/auth/me`. The gate never edits a
//! user in place; a new value replaces the old one on every sign-in,
//! refresh or hydration.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::value_object::{user_role::UserRole, user_status::UserStatus};

/// Display fields of the user's profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// User entity
///
/// `role` has no default: a payload without one is rejected rather than
/// silently routed as some role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_login_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Accepts RFC 3339 timestamps and the backend's naive UTC timestamps;
/// anything unparseable becomes `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        DateTime::parse_from_rfc3339(&value)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&value, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }))
}

impl User {
    /// Whether this account may hold a session
    ///
    /// Mirrors the backend's sign-in check (`is_active`) plus the
    /// suspended/banned statuses moderators set.
    pub fn can_hold_session(&self) -> bool {
        self.is_active && self.status.allows_session()
    }

    /// Best available name for greetings and headers
    pub fn display_name(&self) -> String {
        if let Some(profile) = &self.profile {
            if let Some(name) = profile.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
                return name.to_string();
            }
            match (profile.first_name.as_deref(), profile.last_name.as_deref()) {
                (Some(first), Some(last)) => return format!("{first} {last}"),
                (Some(first), None) => return first.to_string(),
                _ => {}
            }
        }
        self.email.clone()
    }
}
