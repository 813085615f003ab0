//! Sign In Use Case
//!
//! Exchanges credentials (password, Google ID token, or tokens handed over
//! by an OAuth callback) for a session.

use std::sync::Arc;

use crate::application::state::{GateContext, Generation, ensure_can_hold};
use crate::domain::entity::{credentials::Credentials, session::Session};
use crate::domain::repository::{AuthApi, CredentialStore};
use crate::domain::value_object::{email::Email, password::Password};
use crate::error::{GateError, GateResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in use case
pub struct SignInUseCase<A, S>
where
    A: AuthApi,
    S: CredentialStore,
{
    ctx: Arc<GateContext<A, S>>,
}

impl<A, S> SignInUseCase<A, S>
where
    A: AuthApi + Send + Sync + 'static,
    S: CredentialStore + Send + Sync + 'static,
{
    pub(crate) fn new(ctx: Arc<GateContext<A, S>>) -> Self {
        Self { ctx }
    }

    /// Password sign-in
    ///
    /// A failure leaves the current session and the store untouched.
    pub async fn execute(&self, input: SignInInput) -> GateResult<Session> {
        let email = Email::new(&input.email)?;
        let password = Password::for_sign_in(input.password)?;

        let generation = self.ctx.cell.generation();
        self.authenticate(generation, &email, &password).await
    }

    /// Sign in with a Google ID token obtained by the caller
    pub async fn with_google(&self, google_token: &str) -> GateResult<Session> {
        let google_token = google_token.trim();
        if google_token.is_empty() {
            return Err(GateError::Validation("Google token is required".to_string()));
        }

        let generation = self.ctx.cell.generation();
        let grant = self
            .ctx
            .api
            .login_with_google(google_token)
            .await
            .inspect_err(GateError::log)?;

        let session = self.ctx.install_grant(generation, grant).await?;
        tracing::info!(user_id = ?session.user().map(|u| u.id), "Signed in with Google");
        Ok(session)
    }

    /// Adopt tokens delivered by an OAuth redirect
    ///
    /// The token is validated against `/auth/me` before anything is stored.
    pub async fn accept_callback(&self, credentials: Credentials) -> GateResult<Session> {
        if credentials.access_token.is_blank() {
            return Err(GateError::Validation("Missing access token".to_string()));
        }

        let generation = self.ctx.cell.generation();
        let user = self
            .ctx
            .api
            .current_user(&credentials.access_token)
            .await
            .inspect_err(GateError::log)?;
        ensure_can_hold(&user)?;

        self.ctx.establish(generation, credentials, user).await
    }

    /// Password sign-in bound to an already captured generation
    pub(crate) async fn authenticate(
        &self,
        generation: Generation,
        email: &Email,
        password: &Password,
    ) -> GateResult<Session> {
        let grant = self
            .ctx
            .api
            .login(email, password)
            .await
            .inspect_err(GateError::log)?;

        let session = self.ctx.install_grant(generation, grant).await?;
        tracing::info!(user_id = ?session.user().map(|u| u.id), "User signed in");
        Ok(session)
    }
}
