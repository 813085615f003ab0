//! Refresh Use Case
//!
//! Rotates the stored access token with the refresh token.

use std::sync::Arc;

use crate::application::state::GateContext;
use crate::domain::entity::session::Session;
use crate::domain::repository::{AuthApi, AuthGrant, CredentialStore};
use crate::error::{GateError, GateResult};

/// Refresh use case
pub struct RefreshUseCase<A, S>
where
    A: AuthApi,
    S: CredentialStore,
{
    ctx: Arc<GateContext<A, S>>,
}

impl<A, S> RefreshUseCase<A, S>
where
    A: AuthApi + Send + Sync + 'static,
    S: CredentialStore + Send + Sync + 'static,
{
    pub(crate) fn new(ctx: Arc<GateContext<A, S>>) -> Self {
        Self { ctx }
    }

    /// Rejected credentials end the session; transport failures keep it.
    pub async fn execute(&self) -> GateResult<Session> {
        let generation = self.ctx.cell.generation();

        let stored = self
            .ctx
            .store
            .load()
            .await?
            .ok_or(GateError::NotAuthenticated)?;
        let refresh_token = stored
            .refresh_token
            .clone()
            .ok_or(GateError::NotAuthenticated)?;

        let result = match self.ctx.api.refresh(&refresh_token).await {
            Ok(grant) => {
                let grant = AuthGrant {
                    credentials: grant.credentials.inherit_refresh_token(&stored),
                    user: grant.user,
                };
                self.ctx.install_grant(generation, grant).await
            }
            Err(err) => Err(err),
        };

        match &result {
            Ok(_) => tracing::info!(generation, "Access token refreshed"),
            Err(err) if err.clears_session() => {
                tracing::warn!(generation, error = %err, "Refresh rejected, signing out");
                self.ctx.expire(generation).await;
            }
            Err(err) => err.log(),
        }

        result
    }
}
