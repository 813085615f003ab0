//! Sign Out Use Case
//!
//! Ends the session locally first, then tells the backend.

use std::sync::Arc;

use crate::application::state::GateContext;
use crate::domain::entity::session::Session;
use crate::domain::repository::{AuthApi, CredentialStore};

/// Sign out use case
pub struct SignOutUseCase<A, S>
where
    A: AuthApi,
    S: CredentialStore,
{
    ctx: Arc<GateContext<A, S>>,
}

impl<A, S> SignOutUseCase<A, S>
where
    A: AuthApi + Send + Sync + 'static,
    S: CredentialStore + Send + Sync + 'static,
{
    pub(crate) fn new(ctx: Arc<GateContext<A, S>>) -> Self {
        Self { ctx }
    }

    /// Sign out
    ///
    /// Any sign-in, refresh or hydration still in flight is discarded.
    /// The remote call is best effort and never fails the sign-out.
    pub async fn execute(&self) {
        let previous = self.ctx.cell.snapshot();
        let generation = self.ctx.cell.replace(Session::Anonymous);

        let stored = self.ctx.clear_store_if_current(generation).await;

        tracing::info!(
            generation,
            user_id = ?previous.user().map(|u| u.id),
            "User signed out"
        );

        let token = previous
            .token()
            .cloned()
            .or_else(|| stored.map(|c| c.access_token));

        if let Some(token) = token
            && let Err(err) = self.ctx.api.logout(&token).await
        {
            tracing::debug!(error = %err, "Remote sign-out failed, local session already cleared");
        }
    }
}
