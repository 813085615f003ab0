//! Collaborator Traits
//!
//! The gate talks to the backend and to persistent storage only through
//! these traits. Implementations live in the infrastructure layer.

use crate::domain::entity::{credentials::Credentials, user::User};
use crate::domain::value_object::{
    email::Email,
    password::Password,
    token::{AccessToken, RefreshToken},
    user_role::UserRole,
};
use crate::error::GateResult;

/// Tokens issued by a successful sign-in, sign-up or refresh
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub credentials: Credentials,
    /// Present when the backend embeds the user in the token response
    pub user: Option<User>,
}

/// Result of `/auth/register`
#[derive(Debug, Clone)]
pub enum Registration {
    /// The backend signed the new user in directly
    Granted(AuthGrant),
    /// The backend only created the account; a sign-in must follow
    Created(User),
}

/// Backend Auth API
#[trait_variant::make(AuthApi: Send)]
pub trait LocalAuthApi {
    /// `POST /auth/login`
    async fn login(&self, email: &Email, password: &Password) -> GateResult<AuthGrant>;

    /// `POST /auth/register`
    async fn register(
        &self,
        email: &Email,
        password: &Password,
        role: UserRole,
    ) -> GateResult<Registration>;

    /// `POST /auth/google`
    async fn login_with_google(&self, google_token: &str) -> GateResult<AuthGrant>;

    /// `GET /auth/me`
    async fn current_user(&self, token: &AccessToken) -> GateResult<User>;

    /// `POST /auth/logout`
    async fn logout(&self, token: &AccessToken) -> GateResult<()>;

    /// `POST /auth/refresh`
    async fn refresh(&self, refresh_token: &RefreshToken) -> GateResult<AuthGrant>;
}

/// Persistent home of the credentials between runs
#[trait_variant::make(CredentialStore: Send)]
pub trait LocalCredentialStore {
    async fn load(&self) -> GateResult<Option<Credentials>>;

    async fn save(&self, credentials: &Credentials) -> GateResult<()>;

    /// Remove stored credentials; clearing an empty store is not an error
    async fn clear(&self) -> GateResult<()>;
}
