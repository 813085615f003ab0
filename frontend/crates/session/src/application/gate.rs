//! Session Gate
//!
//! The single owner of "who is the current user". Cheap to clone; every
//! clone shares one session.

use std::sync::Arc;

use tokio::sync::watch;

use crate::application::config::GateConfig;
use crate::application::hydrate::HydrateUseCase;
use crate::application::refresh::RefreshUseCase;
use crate::application::sign_in::{SignInInput, SignInUseCase};
use crate::application::sign_out::SignOutUseCase;
use crate::application::sign_up::{SignUpInput, SignUpUseCase};
use crate::application::state::GateContext;
use crate::domain::entity::{credentials::Credentials, session::Session};
use crate::domain::policy::{AccessDecision, RoutePolicy, authorize};
use crate::domain::repository::{AuthApi, CredentialStore};
use crate::domain::value_object::user_role::UserRole;
use crate::error::GateResult;

pub struct SessionGate<A, S>
where
    A: AuthApi,
    S: CredentialStore,
{
    ctx: Arc<GateContext<A, S>>,
    policy: Arc<RoutePolicy>,
}

impl<A, S> Clone for SessionGate<A, S>
where
    A: AuthApi,
    S: CredentialStore,
{
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl<A, S> SessionGate<A, S>
where
    A: AuthApi + Send + Sync + 'static,
    S: CredentialStore + Send + Sync + 'static,
{
    pub fn new(api: A, store: S, config: GateConfig) -> Self {
        Self::from_parts(Arc::new(api), Arc::new(store), Arc::new(config))
    }

    pub fn from_parts(api: Arc<A>, store: Arc<S>, config: Arc<GateConfig>) -> Self {
        Self {
            ctx: Arc::new(GateContext::new(api, store, config)),
            policy: Arc::new(RoutePolicy::default()),
        }
    }

    /// Replace the default role → route table
    pub fn with_policy(mut self, policy: RoutePolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Resolve the start-up session
    ///
    /// Idempotent within a generation: repeated or concurrent calls make
    /// at most one validation round trip.
    pub async fn hydrate(&self) -> Session {
        HydrateUseCase::new(self.ctx.clone()).execute().await
    }

    pub async fn login(&self, email: &str, password: &str) -> GateResult<Session> {
        SignInUseCase::new(self.ctx.clone())
            .execute(SignInInput {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
    }

    pub async fn login_with_google(&self, google_token: &str) -> GateResult<Session> {
        SignInUseCase::new(self.ctx.clone())
            .with_google(google_token)
            .await
    }

    /// Adopt tokens delivered to an OAuth callback route
    pub async fn accept_callback(&self, credentials: Credentials) -> GateResult<Session> {
        SignInUseCase::new(self.ctx.clone())
            .accept_callback(credentials)
            .await
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> GateResult<Session> {
        SignUpUseCase::new(self.ctx.clone())
            .execute(SignUpInput {
                email: email.to_string(),
                password: password.to_string(),
                role,
            })
            .await
    }

    pub async fn refresh(&self) -> GateResult<Session> {
        RefreshUseCase::new(self.ctx.clone()).execute().await
    }

    /// Always succeeds locally; wins over any sign-in still in flight
    pub async fn logout(&self) {
        SignOutUseCase::new(self.ctx.clone()).execute().await
    }

    /// Decide access for the current session
    pub fn authorize(&self, required: &[UserRole]) -> AccessDecision {
        authorize(&self.session(), required)
    }

    /// Current session snapshot
    pub fn session(&self) -> Session {
        self.ctx.cell.snapshot()
    }

    /// Observe every published session change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.ctx.cell.subscribe()
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    pub fn shared_policy(&self) -> Arc<RoutePolicy> {
        self.policy.clone()
    }

    pub fn config(&self) -> &GateConfig {
        &self.ctx.config
    }
}
