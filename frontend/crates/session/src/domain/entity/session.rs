//! Session Entity
//!
//! The in-memory answer to "who is the current user". A user is present
//! exactly when a validated token is present; the enum makes any other
//! combination unrepresentable.

use crate::domain::entity::user::User;
use crate::domain::value_object::{token::AccessToken, user_role::UserRole};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    /// Start-up hydration has not resolved yet
    #[default]
    Loading,
    /// Resolved: nobody is signed in
    Anonymous,
    /// Resolved: token validated by the backend for this user
    Authenticated { token: AccessToken, user: User },
}

impl Session {
    pub fn authenticated(token: AccessToken, user: User) -> Self {
        Session::Authenticated { token, user }
    }

    pub fn token(&self) -> Option<&AccessToken> {
        match self {
            Session::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user().map(|user| user.role)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Session::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }
}
