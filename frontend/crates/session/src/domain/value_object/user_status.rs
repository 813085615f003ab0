//! User Status Value Object
//!
//! Account status as the backend stores it. The gate only needs to know
//! whether an account may hold a session at all.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    /// Dormant account; the backend still lets it sign in
    Inactive,
    Suspended,
    Banned,
    #[serde(other)]
    Unknown,
}

impl UserStatus {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
            Self::Banned => "banned",
            Self::Unknown => "unknown",
        }
    }

    /// Whether an account in this status may hold a session
    #[inline]
    pub const fn allows_session(&self) -> bool {
        !matches!(self, Self::Suspended | Self::Banned)
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
