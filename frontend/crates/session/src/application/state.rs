//! Shared Gate State
//!
//! [`SessionCell`] holds the published session, the generation counter and
//! the memoized hydration for the current generation. [`GateContext`]
//! bundles it with the collaborators and the writer lock that orders
//! credential-store writes against session commits.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{OnceCell, watch};

use crate::application::config::GateConfig;
use crate::domain::entity::{credentials::Credentials, session::Session, user::User};
use crate::domain::repository::{AuthApi, AuthGrant, CredentialStore};
use crate::error::{GateError, GateResult};

pub(crate) type Generation = u64;

struct Epoch {
    generation: Generation,
    hydration: Arc<OnceCell<Session>>,
}

/// Published session plus the generation it belongs to
///
/// Every wholesale replacement starts a new generation and installs an
/// already-resolved hydration for it. Continuations that captured an
/// older generation find their commit refused.
pub(crate) struct SessionCell {
    tx: watch::Sender<Session>,
    epoch: Mutex<Epoch>,
}

impl SessionCell {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::Loading);
        Self {
            tx,
            epoch: Mutex::new(Epoch {
                generation: 0,
                hydration: Arc::new(OnceCell::new()),
            }),
        }
    }

    fn epoch(&self) -> MutexGuard<'_, Epoch> {
        self.epoch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn generation(&self) -> Generation {
        self.epoch().generation
    }

    /// Current generation and its hydration slot
    pub(crate) fn ticket(&self) -> (Generation, Arc<OnceCell<Session>>) {
        let epoch = self.epoch();
        (epoch.generation, epoch.hydration.clone())
    }

    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        self.epoch().generation == generation
    }

    pub(crate) fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Publish a hydration outcome within the same generation
    pub(crate) fn publish_if_current(&self, generation: Generation, session: Session) -> bool {
        let epoch = self.epoch();
        if epoch.generation != generation {
            return false;
        }
        self.tx.send_replace(session);
        true
    }

    /// Replace the session wholesale if nobody else has since
    pub(crate) fn replace_if_current(
        &self,
        generation: Generation,
        session: Session,
    ) -> Option<Generation> {
        let mut epoch = self.epoch();
        if epoch.generation != generation {
            return None;
        }
        Some(Self::advance(&mut epoch, &self.tx, session))
    }

    /// Replace the session wholesale regardless of what is in flight
    pub(crate) fn replace(&self, session: Session) -> Generation {
        let mut epoch = self.epoch();
        Self::advance(&mut epoch, &self.tx, session)
    }

    fn advance(epoch: &mut Epoch, tx: &watch::Sender<Session>, session: Session) -> Generation {
        epoch.generation += 1;
        epoch.hydration = Arc::new(OnceCell::new_with(Some(session.clone())));
        tx.send_replace(session);
        epoch.generation
    }
}

/// Reject users whose account may not hold a session
pub(crate) fn ensure_can_hold(user: &User) -> GateResult<()> {
    if user.can_hold_session() {
        Ok(())
    } else {
        tracing::warn!(
            user_id = user.id,
            status = %user.status,
            is_active = user.is_active,
            "Account may not hold a session"
        );
        Err(GateError::AccountDisabled)
    }
}

pub(crate) struct GateContext<A, S> {
    pub(crate) api: Arc<A>,
    pub(crate) store: Arc<S>,
    pub(crate) cell: SessionCell,
    /// Held while writing the store and committing the matching session
    pub(crate) writer: tokio::sync::Mutex<()>,
    pub(crate) config: Arc<GateConfig>,
}

impl<A, S> GateContext<A, S>
where
    A: AuthApi + Send + Sync + 'static,
    S: CredentialStore + Send + Sync + 'static,
{
    pub(crate) fn new(api: Arc<A>, store: Arc<S>, config: Arc<GateConfig>) -> Self {
        Self {
            api,
            store,
            cell: SessionCell::new(),
            writer: tokio::sync::Mutex::new(()),
            config,
        }
    }

    /// Turn a token grant into the current session
    ///
    /// Fetches the user when the grant did not embed one.
    pub(crate) async fn install_grant(
        &self,
        generation: Generation,
        grant: AuthGrant,
    ) -> GateResult<Session> {
        let user = match grant.user {
            Some(user) => user,
            None => {
                self.api
                    .current_user(&grant.credentials.access_token)
                    .await?
            }
        };
        ensure_can_hold(&user)?;
        self.establish(generation, grant.credentials, user).await
    }

    /// Persist credentials and publish the matching session
    pub(crate) async fn establish(
        &self,
        generation: Generation,
        credentials: Credentials,
        user: User,
    ) -> GateResult<Session> {
        let _writer = self.writer.lock().await;

        if !self.cell.is_current(generation) {
            tracing::debug!(generation, "Discarding superseded sign-in");
            return Err(GateError::Superseded);
        }

        self.store.save(&credentials).await?;

        let user_id = user.id;
        let role = user.role;
        let session = Session::authenticated(credentials.access_token, user);

        // A sign-out that slipped in after the save clears the store once
        // this writer is released.
        match self.cell.replace_if_current(generation, session.clone()) {
            Some(next) => {
                tracing::info!(generation = next, user_id, role = %role, "Session established");
                Ok(session)
            }
            None => {
                tracing::debug!(generation, "Sign-in lost the race against sign-out");
                Err(GateError::Superseded)
            }
        }
    }

    /// Save rotated credentials without changing the published session
    pub(crate) async fn persist_if_current(
        &self,
        generation: Generation,
        credentials: &Credentials,
    ) -> GateResult<()> {
        let _writer = self.writer.lock().await;
        if !self.cell.is_current(generation) {
            return Err(GateError::Superseded);
        }
        self.store.save(credentials).await
    }

    /// Implicit sign-out after the backend rejected the stored credentials
    pub(crate) async fn expire(&self, generation: Generation) {
        let _writer = self.writer.lock().await;

        if !self.cell.is_current(generation) {
            return;
        }

        if let Err(err) = self.store.clear().await {
            err.log();
        }

        if let Some(next) = self.cell.replace_if_current(generation, Session::Anonymous) {
            tracing::info!(generation = next, "Session cleared after credential rejection");
        }
    }

    /// Remove stored credentials unless a newer session has been saved
    ///
    /// Returns what was stored, for the best-effort remote sign-out.
    pub(crate) async fn clear_store_if_current(
        &self,
        generation: Generation,
    ) -> Option<Credentials> {
        let _writer = self.writer.lock().await;

        if !self.cell.is_current(generation) {
            return None;
        }

        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(err) => {
                err.log();
                None
            }
        };

        if let Err(err) = self.store.clear().await {
            err.log();
        }

        stored
    }
}
