//! Password Value Object
//!
//! Plain-text password on its way to the backend. It is never stored by
//! the gate and never printed.

use kernel::error::app_error::{AppError, AppResult};
use std::fmt;

/// Minimum length the backend accepts for new passwords
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Upper bound to keep request bodies sane
const PASSWORD_MAX_LENGTH: usize = 1024;

#[derive(Clone)]
pub struct Password(String);

impl Password {
    /// Password typed into the sign-in form; only emptiness is checked
    pub fn for_sign_in(password: impl Into<String>) -> AppResult<Self> {
        let password = password.into();
        if password.is_empty() {
            return Err(AppError::bad_request("Password cannot be empty"));
        }
        if password.chars().count() > PASSWORD_MAX_LENGTH {
            return Err(AppError::bad_request("Password is too long"));
        }
        Ok(Self(password))
    }

    /// Password chosen during registration
    pub fn for_sign_up(password: impl Into<String>) -> AppResult<Self> {
        let password = Self::for_sign_in(password)?;
        if password.0.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(AppError::unprocessable(format!(
                "Password must be at least {} characters",
                PASSWORD_MIN_LENGTH
            )));
        }
        Ok(password)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}
