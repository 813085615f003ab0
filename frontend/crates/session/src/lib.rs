//! Session Gate
//!
//! Clean Architecture structure:
//! - `domain/` - Session, user, credentials, access policy, collaborator traits
//! - `application/` - Use cases and the [`SessionGate`] that owns them
//! - `infra/` - HTTP Auth API client, credential stores
//! - `presentation/` - Route guard
//!
//! ## Features
//! - Start-up hydration from persisted credentials, single-flight
//! - Sign-in with password or Google, sign-up, OAuth callback adoption
//! - Token refresh with implicit sign-out on rejection
//! - Role-based route guarding with login and landing redirects
//!
//! ## Session Model
//! - One owned session, replaced wholesale and observable via `watch`
//! - Every replacement starts a new generation; late results of older
//!   generations are discarded
//! - Sign-out always wins over a sign-in still in flight

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::{config::GateConfig, gate::SessionGate};
pub use domain::{
    AccessDecision, AuthApi, AuthGrant, CredentialStore, Credentials, Registration, RoutePolicy,
    RouteRule, Session, User, authorize,
};
pub use domain::value_object::{user_role::UserRole, user_status::UserStatus};
pub use error::{GateError, GateResult};
pub use infra::{
    CookieCredentialStore, FileCredentialStore, HttpAuthApi, MemoryCredentialStore, cookie_gate,
    file_gate,
};
pub use presentation::{GuardOutcome, RouteGuard};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
}

#[cfg(test)]
mod tests;
