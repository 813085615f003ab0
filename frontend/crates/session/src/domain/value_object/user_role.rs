use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketplace role as reported by the backend.
///
/// Unknown wire values decode to [`UserRole::Unknown`] instead of failing,
/// so every user the backend can return maps to some routing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Moderator,
    Helpdesk,
    Freelancer,
    Customer,
    #[serde(other)]
    Unknown,
}

impl UserRole {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            Admin => "admin",
            Moderator => "moderator",
            Helpdesk => "helpdesk",
            Freelancer => "freelancer",
            Customer => "customer",
            Unknown => "unknown",
        }
    }

    /// Landing route after sign-in, and the redirect target when the user
    /// opens a page their role may not see.
    #[inline]
    pub const fn default_route(&self) -> &'static str {
        use UserRole::*;
        match self {
            Admin => "/admin",
            Moderator => "/moderator",
            Customer => "/customer",
            Freelancer => "/freelancer",
            Helpdesk | Unknown => "/",
        }
    }

    /// Roles a visitor may pick when registering
    #[inline]
    pub const fn is_self_service(&self) -> bool {
        matches!(self, UserRole::Customer | UserRole::Freelancer)
    }

    #[inline]
    pub fn from_code(code: &str) -> Self {
        use UserRole::*;
        match code.trim().to_ascii_lowercase().as_str() {
            "admin" => Admin,
            "moderator" => Moderator,
            "helpdesk" => Helpdesk,
            "freelancer" => Freelancer,
            "customer" => Customer,
            other => {
                tracing::debug!(role = other, "Unrecognized user role");
                Unknown
            }
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
