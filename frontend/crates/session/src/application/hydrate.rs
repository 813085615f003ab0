//! Hydrate Use Case
//!
//! Resolves the start-up session from the credential store. Concurrent
//! callers within one generation share a single resolution.

use std::sync::Arc;

use chrono::Utc;

use crate::application::state::{GateContext, Generation, ensure_can_hold};
use crate::domain::entity::{credentials::Credentials, session::Session};
use crate::domain::repository::{AuthApi, CredentialStore};
use crate::error::{GateError, GateResult};

/// Hydrate use case
pub struct HydrateUseCase<A, S>
where
    A: AuthApi,
    S: CredentialStore,
{
    ctx: Arc<GateContext<A, S>>,
}

impl<A, S> HydrateUseCase<A, S>
where
    A: AuthApi + Send + Sync + 'static,
    S: CredentialStore + Send + Sync + 'static,
{
    pub(crate) fn new(ctx: Arc<GateContext<A, S>>) -> Self {
        Self { ctx }
    }

    /// Resolve the session, or join the resolution already running
    ///
    /// Never fails: every failure resolves to `Anonymous`.
    pub async fn execute(&self) -> Session {
        let (generation, memo) = self.ctx.cell.ticket();

        let resolved = memo
            .get_or_init(|| self.resolve(generation))
            .await
            .clone();

        if self.ctx.cell.is_current(generation) {
            resolved
        } else {
            // Replaced while resolving; the replacement is the answer.
            self.ctx.cell.snapshot()
        }
    }

    async fn resolve(&self, generation: Generation) -> Session {
        let stored = match self.ctx.store.load().await {
            Ok(stored) => stored.filter(|c| !c.access_token.is_blank()),
            Err(err) => return self.fail(generation, err).await,
        };

        let Some(credentials) = stored else {
            tracing::debug!(generation, "No stored credentials");
            self.ctx.cell.publish_if_current(generation, Session::Anonymous);
            return Session::Anonymous;
        };

        match self.validate(generation, credentials).await {
            Ok(session) => {
                if self.ctx.cell.publish_if_current(generation, session.clone()) {
                    if let Some(user) = session.user() {
                        tracing::info!(
                            generation,
                            user_id = user.id,
                            role = %user.role,
                            "Session restored"
                        );
                    }
                    session
                } else {
                    self.ctx.cell.snapshot()
                }
            }
            Err(err) => self.fail(generation, err).await,
        }
    }

    async fn validate(
        &self,
        generation: Generation,
        credentials: Credentials,
    ) -> GateResult<Session> {
        let leeway = self.ctx.config.refresh_leeway_chrono();

        let (credentials, user) = match credentials.refresh_token.clone() {
            Some(refresh_token) if credentials.needs_refresh(Utc::now(), leeway) => {
                tracing::debug!(generation, "Stored access token is expiring, refreshing");
                let grant = self.ctx.api.refresh(&refresh_token).await?;
                let renewed = grant.credentials.inherit_refresh_token(&credentials);
                self.ctx.persist_if_current(generation, &renewed).await?;
                (renewed, grant.user)
            }
            _ => (credentials, None),
        };

        let user = match user {
            Some(user) => user,
            None => self.ctx.api.current_user(&credentials.access_token).await?,
        };
        ensure_can_hold(&user)?;

        Ok(Session::authenticated(credentials.access_token, user))
    }

    /// Fail closed: discard the stored credentials and resolve anonymous
    async fn fail(&self, generation: Generation, err: GateError) -> Session {
        if matches!(err, GateError::Superseded) {
            return self.ctx.cell.snapshot();
        }

        err.log();
        tracing::warn!(generation, error = %err, "Hydration failed, clearing stored credentials");

        self.ctx.expire(generation).await;
        Session::Anonymous
    }
}
