//! Domain Layer
//!
//! Contains entities, value objects, the access policy and the
//! collaborator traits.

pub mod entity;
pub mod policy;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{credentials::Credentials, session::Session, user::User};
pub use policy::{AccessDecision, RoutePolicy, RouteRule, authorize};
pub use repository::{AuthApi, AuthGrant, CredentialStore, Registration};
