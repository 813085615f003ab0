//! Scenario tests for the session gate
//! Drives the gate end to end against an in-memory Auth API.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Notify;

use crate::application::{config::GateConfig, gate::SessionGate};
use crate::domain::entity::{credentials::Credentials, session::Session, user::User};
use crate::domain::policy::AccessDecision;
use crate::domain::repository::{AuthApi, AuthGrant, CredentialStore, Registration};
use crate::domain::value_object::{
    email::Email,
    password::Password,
    token::{AccessToken, RefreshToken},
    user_role::UserRole,
    user_status::UserStatus,
};
use crate::error::{GateError, GateResult};
use crate::infra::store::MemoryCredentialStore;
use crate::presentation::guard::{GuardOutcome, RouteGuard};

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Default)]
struct Calls {
    login: AtomicUsize,
    register: AtomicUsize,
    google: AtomicUsize,
    me: AtomicUsize,
    logout: AtomicUsize,
    refresh: AtomicUsize,
}

fn count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Auth API double with call counters and switches for each failure mode
#[derive(Default)]
struct FakeAuthApi {
    accounts: Mutex<HashMap<String, (String, User)>>,
    access: Mutex<HashMap<String, User>>,
    refresh: Mutex<HashMap<String, User>>,
    issued: AtomicUsize,
    calls: Calls,
    /// Login responses omit the user
    bare_login: AtomicBool,
    /// Register answers with only the created user
    register_user_only: AtomicBool,
    me_unreachable: AtomicBool,
    refresh_unreachable: AtomicBool,
    logout_fails: AtomicBool,
    me_delay: Mutex<Option<Duration>>,
    login_hold: Mutex<Option<Arc<Notify>>>,
    login_entered: Notify,
    me_hold: Mutex<Option<Arc<Notify>>>,
    me_entered: Notify,
}

impl FakeAuthApi {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn add_account(&self, email: &str, password: &str, user: User) {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (password.to_string(), user));
    }

    /// Mint a token pair the fake will accept for `user`
    fn issue(&self, user: &User) -> Credentials {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let access = format!("access-{n}");
        let refresh = format!("refresh-{n}");
        self.access.lock().unwrap().insert(access.clone(), user.clone());
        self.refresh.lock().unwrap().insert(refresh.clone(), user.clone());

        Credentials::new(AccessToken::new(access))
            .with_refresh_token(Some(RefreshToken::new(refresh)))
            .expiring_in(Some(1800), Utc::now())
    }

    fn revoke_all(&self) {
        self.access.lock().unwrap().clear();
        self.refresh.lock().unwrap().clear();
    }

    fn hold_logins(&self) -> Arc<Notify> {
        let hold = Arc::new(Notify::new());
        *self.login_hold.lock().unwrap() = Some(hold.clone());
        hold
    }

    fn hold_me(&self) -> Arc<Notify> {
        let hold = Arc::new(Notify::new());
        *self.me_hold.lock().unwrap() = Some(hold.clone());
        hold
    }

    fn grant_for(&self, user: &User, embed_user: bool) -> AuthGrant {
        AuthGrant {
            credentials: self.issue(user),
            user: embed_user.then(|| user.clone()),
        }
    }
}

impl AuthApi for FakeAuthApi {
    async fn login(&self, email: &Email, password: &Password) -> GateResult<AuthGrant> {
        self.calls.login.fetch_add(1, Ordering::SeqCst);
        self.login_entered.notify_one();

        let hold = self.login_hold.lock().unwrap().clone();
        if let Some(hold) = hold {
            hold.notified().await;
        }

        let account = self.accounts.lock().unwrap().get(email.as_str()).cloned();
        match account {
            Some((stored, user)) if stored == password.expose() => {
                let embed = !self.bare_login.load(Ordering::SeqCst);
                Ok(self.grant_for(&user, embed))
            }
            _ => Err(GateError::Authentication(
                "Invalid email or password".to_string(),
            )),
        }
    }

    async fn register(
        &self,
        email: &Email,
        password: &Password,
        role: UserRole,
    ) -> GateResult<Registration> {
        self.calls.register.fetch_add(1, Ordering::SeqCst);

        if self.accounts.lock().unwrap().contains_key(email.as_str()) {
            return Err(GateError::Validation("Email already registered".to_string()));
        }

        let id = 100 + count(&self.calls.register) as i64;
        let created = user(id, email.as_str(), role);
        self.add_account(email.as_str(), password.expose(), created.clone());

        if self.register_user_only.load(Ordering::SeqCst) {
            Ok(Registration::Created(created))
        } else {
            Ok(Registration::Granted(self.grant_for(&created, true)))
        }
    }

    async fn login_with_google(&self, google_token: &str) -> GateResult<AuthGrant> {
        self.calls.google.fetch_add(1, Ordering::SeqCst);
        if google_token == "google-ok" {
            Ok(self.grant_for(&user(40, "g@example.com", UserRole::Customer), true))
        } else {
            Err(GateError::Authentication("Invalid Google token".to_string()))
        }
    }

    async fn current_user(&self, token: &AccessToken) -> GateResult<User> {
        self.calls.me.fetch_add(1, Ordering::SeqCst);
        self.me_entered.notify_one();

        let hold = self.me_hold.lock().unwrap().clone();
        if let Some(hold) = hold {
            hold.notified().await;
        }
        let delay = *self.me_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.me_unreachable.load(Ordering::SeqCst) {
            return Err(GateError::Network("connection refused".to_string()));
        }

        self.access
            .lock()
            .unwrap()
            .get(token.expose())
            .cloned()
            .ok_or_else(|| GateError::Authentication("Invalid authentication credentials".into()))
    }

    async fn logout(&self, token: &AccessToken) -> GateResult<()> {
        self.calls.logout.fetch_add(1, Ordering::SeqCst);
        self.access.lock().unwrap().remove(token.expose());

        if self.logout_fails.load(Ordering::SeqCst) {
            Err(GateError::Unavailable("Service Unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    async fn refresh(&self, refresh_token: &RefreshToken) -> GateResult<AuthGrant> {
        self.calls.refresh.fetch_add(1, Ordering::SeqCst);

        if self.refresh_unreachable.load(Ordering::SeqCst) {
            return Err(GateError::Network("timed out".to_string()));
        }

        let owner = self.refresh.lock().unwrap().remove(refresh_token.expose());
        match owner {
            Some(user) => Ok(self.grant_for(&user, false)),
            None => Err(GateError::Authentication("Invalid refresh token".to_string())),
        }
    }
}

fn user(id: i64, email: &str, role: UserRole) -> User {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "email": email,
        "role": role.code(),
        "status": "active",
        "is_active": true,
        "is_verified": true,
    }))
    .unwrap()
}

type TestGate = SessionGate<FakeAuthApi, MemoryCredentialStore>;

fn gate_with(api: &Arc<FakeAuthApi>, store: &Arc<MemoryCredentialStore>) -> TestGate {
    SessionGate::from_parts(
        api.clone(),
        store.clone(),
        Arc::new(GateConfig::development()),
    )
}

fn setup() -> (TestGate, Arc<FakeAuthApi>, Arc<MemoryCredentialStore>) {
    let api = FakeAuthApi::new();
    let store = Arc::new(MemoryCredentialStore::new());
    (gate_with(&api, &store), api, store)
}

fn guard_for(gate: &TestGate) -> RouteGuard {
    RouteGuard::new(gate.shared_policy(), gate.config())
}

const FREELANCER_EMAIL: &str = "fran@example.com";
const PASSWORD: &str = "correct horse";

fn with_freelancer(api: &FakeAuthApi) -> User {
    let fran = user(7, FREELANCER_EMAIL, UserRole::Freelancer);
    api.add_account(FREELANCER_EMAIL, PASSWORD, fran.clone());
    fran
}

// =============================================================================
// Hydration
// =============================================================================

mod hydrate_tests {
    use super::*;

    #[tokio::test]
    async fn test_no_stored_token_resolves_anonymous_without_calls() {
        let (gate, api, _store) = setup();

        let session = gate.hydrate().await;

        assert_eq!(session, Session::Anonymous);
        assert!(!gate.session().is_loading());
        assert!(gate.session().user().is_none());
        assert_eq!(count(&api.calls.me), 0);
        assert_eq!(count(&api.calls.refresh), 0);
    }

    #[tokio::test]
    async fn test_valid_stored_token_restores_session() {
        let (gate, api, store) = setup();
        let fran = with_freelancer(&api);
        let credentials = api.issue(&fran);
        store.save(&credentials).await.unwrap();

        let session = gate.hydrate().await;

        assert_eq!(session.user(), Some(&fran));
        assert_eq!(session.token(), Some(&credentials.access_token));
        assert_eq!(count(&api.calls.me), 1);
        assert_eq!(store.load().await.unwrap(), Some(credentials));
    }

    #[tokio::test]
    async fn test_rejected_token_clears_store() {
        let (gate, api, store) = setup();
        store
            .save(&Credentials::new(AccessToken::new("stale")))
            .await
            .unwrap();

        let session = gate.hydrate().await;

        assert_eq!(session, Session::Anonymous);
        assert_eq!(gate.session(), Session::Anonymous);
        assert!(store.load().await.unwrap().is_none());
        assert_eq!(count(&api.calls.me), 1);
    }

    #[tokio::test]
    async fn test_unreachable_backend_fails_closed() {
        let (gate, api, store) = setup();
        let fran = with_freelancer(&api);
        store.save(&api.issue(&fran)).await.unwrap();
        api.me_unreachable.store(true, Ordering::SeqCst);

        assert_eq!(gate.hydrate().await, Session::Anonymous);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disabled_account_clears_store() {
        let (gate, api, store) = setup();
        let mut banned = user(9, "b@example.com", UserRole::Customer);
        banned.status = UserStatus::Banned;
        store.save(&api.issue(&banned)).await.unwrap();

        assert_eq!(gate.hydrate().await, Session::Anonymous);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_hydrations_share_one_request() {
        let (gate, api, store) = setup();
        let fran = with_freelancer(&api);
        store.save(&api.issue(&fran)).await.unwrap();
        *api.me_delay.lock().unwrap() = Some(Duration::from_millis(50));

        let other = gate.clone();
        let (a, b, c) = tokio::join!(gate.hydrate(), gate.hydrate(), other.hydrate());

        assert_eq!(count(&api.calls.me), 1);
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.user(), Some(&fran));

        // Resolved hydration is memoized
        gate.hydrate().await;
        assert_eq!(count(&api.calls.me), 1);
    }

    #[tokio::test]
    async fn test_expiring_token_is_refreshed_first() {
        let (gate, api, store) = setup();
        let fran = with_freelancer(&api);
        let issued = api.issue(&fran);
        let expiring = Credentials {
            expires_at: Some(Utc::now() - chrono::Duration::seconds(5)),
            ..issued.clone()
        };
        store.save(&expiring).await.unwrap();

        let session = gate.hydrate().await;

        assert_eq!(count(&api.calls.refresh), 1);
        assert_eq!(session.user(), Some(&fran));
        assert_ne!(session.token(), Some(&issued.access_token));

        let stored = store.load().await.unwrap().unwrap();
        assert_eq!(Some(&stored.access_token), session.token());
        assert_ne!(stored.refresh_token, issued.refresh_token);
    }

    #[tokio::test]
    async fn test_expired_token_with_rejected_refresh_fails_closed() {
        let (gate, api, store) = setup();
        let expired = Credentials::new(AccessToken::new("old"))
            .with_refresh_token(Some(RefreshToken::new("revoked")))
            .expiring_in(Some(1), Utc::now() - chrono::Duration::seconds(60));
        store.save(&expired).await.unwrap();

        assert_eq!(gate.hydrate().await, Session::Anonymous);
        assert_eq!(count(&api.calls.refresh), 1);
        assert_eq!(count(&api.calls.me), 0);
        assert!(store.load().await.unwrap().is_none());
    }
}

// =============================================================================
// Authorization
// =============================================================================

mod authorize_tests {
    use super::*;

    #[tokio::test]
    async fn test_pending_before_hydration() {
        let (gate, _api, _store) = setup();

        assert!(gate.session().is_loading());
        assert_eq!(gate.authorize(&[]), AccessDecision::Pending);
        assert_eq!(gate.authorize(&[UserRole::Admin]), AccessDecision::Pending);
        assert_eq!(
            guard_for(&gate).evaluate_path(&gate.session(), "/admin"),
            GuardOutcome::Loading
        );
    }

    #[tokio::test]
    async fn test_pending_while_hydration_in_flight() {
        let (gate, api, store) = setup();
        let fran = with_freelancer(&api);
        store.save(&api.issue(&fran)).await.unwrap();
        let hold = api.hold_me();

        let hydration = tokio::spawn({
            let gate = gate.clone();
            async move { gate.hydrate().await }
        });
        api.me_entered.notified().await;

        assert_eq!(gate.authorize(&[UserRole::Freelancer]), AccessDecision::Pending);

        hold.notify_one();
        hydration.await.unwrap();
        assert_eq!(gate.authorize(&[UserRole::Freelancer]), AccessDecision::Allow);
    }

    #[tokio::test]
    async fn test_anonymous_is_sent_to_login() {
        let (gate, _api, _store) = setup();
        gate.hydrate().await;

        assert_eq!(
            gate.authorize(&[UserRole::Customer]),
            AccessDecision::DenyUnauthenticated
        );
        assert_eq!(
            guard_for(&gate).evaluate_path(&gate.session(), "/customer/jobs"),
            GuardOutcome::Redirect("/login?next=%2Fcustomer%2Fjobs".into())
        );
    }

    #[tokio::test]
    async fn test_freelancer_scenario() {
        let (gate, api, _store) = setup();
        with_freelancer(&api);
        gate.hydrate().await;

        tokio_test::assert_ok!(gate.login(FREELANCER_EMAIL, PASSWORD).await);

        assert_eq!(
            gate.authorize(&[UserRole::Customer]),
            AccessDecision::DenyWrongRole
        );
        assert_eq!(
            gate.authorize(&[UserRole::Freelancer]),
            AccessDecision::Allow
        );

        let guard = guard_for(&gate);
        assert_eq!(
            guard.evaluate_path(&gate.session(), "/customer"),
            GuardOutcome::Redirect("/freelancer".into())
        );
        assert_eq!(
            guard.evaluate_path(&gate.session(), "/freelancer/proposals"),
            GuardOutcome::Render
        );
    }

    #[tokio::test]
    async fn test_every_role_is_redirected_to_its_landing_route() {
        let roles = [
            (UserRole::Admin, "/admin"),
            (UserRole::Moderator, "/moderator"),
            (UserRole::Customer, "/customer"),
            (UserRole::Freelancer, "/freelancer"),
            (UserRole::Helpdesk, "/"),
        ];

        for (i, (role, landing)) in roles.into_iter().enumerate() {
            let (gate, api, _store) = setup();
            let email = format!("user{i}@example.com");
            api.add_account(&email, PASSWORD, user(i as i64 + 1, &email, role));
            gate.login(&email, PASSWORD).await.unwrap();

            let others: Vec<UserRole> = roles
                .iter()
                .map(|(r, _)| *r)
                .filter(|r| *r != role)
                .collect();
            assert_eq!(gate.authorize(&others), AccessDecision::DenyWrongRole);
            assert_eq!(
                guard_for(&gate).evaluate(&gate.session(), "/elsewhere", &others),
                GuardOutcome::Redirect(landing.to_string())
            );
        }
    }
}

// =============================================================================
// Sign in / sign up
// =============================================================================

mod sign_in_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_persists_and_replaces_hydration() {
        let (gate, api, store) = setup();
        let fran = with_freelancer(&api);

        let session = gate.login(FREELANCER_EMAIL, PASSWORD).await.unwrap();
        assert_eq!(session.user(), Some(&fran));

        let stored = store.load().await.unwrap().unwrap();
        assert_eq!(Some(&stored.access_token), session.token());

        // Hydration after login reuses the login result
        assert_eq!(gate.hydrate().await, session);
        assert_eq!(count(&api.calls.me), 0);
    }

    #[tokio::test]
    async fn test_login_without_embedded_user_fetches_it() {
        let (gate, api, _store) = setup();
        let fran = with_freelancer(&api);
        api.bare_login.store(true, Ordering::SeqCst);

        let session = gate.login(FREELANCER_EMAIL, PASSWORD).await.unwrap();

        assert_eq!(session.user(), Some(&fran));
        assert_eq!(count(&api.calls.me), 1);
    }

    #[tokio::test]
    async fn test_failed_login_changes_nothing() {
        let (gate, api, store) = setup();
        with_freelancer(&api);
        gate.hydrate().await;

        let err = tokio_test::assert_err!(gate.login(FREELANCER_EMAIL, "wrong password").await);

        assert!(matches!(err, GateError::Authentication(_)));
        assert_eq!(err.user_message(), "Invalid email or password");
        assert_eq!(gate.session(), Session::Anonymous);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let (gate, api, _store) = setup();
        with_freelancer(&api);
        let before = gate.login(FREELANCER_EMAIL, PASSWORD).await.unwrap();

        assert!(gate.login(FREELANCER_EMAIL, "nope").await.is_err());
        assert_eq!(gate.session(), before);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_backend() {
        let (gate, api, _store) = setup();

        let err = gate.login("not-an-email", PASSWORD).await.unwrap_err();
        assert!(matches!(err, GateError::Validation(_)));

        let err = gate.login(FREELANCER_EMAIL, "").await.unwrap_err();
        assert!(matches!(err, GateError::Validation(_)));

        assert_eq!(count(&api.calls.login), 0);
    }

    #[tokio::test]
    async fn test_disabled_account_cannot_sign_in() {
        let (gate, api, store) = setup();
        let mut inactive = user(8, "i@example.com", UserRole::Customer);
        inactive.is_active = false;
        api.add_account("i@example.com", PASSWORD, inactive);
        gate.hydrate().await;

        let err = gate.login("i@example.com", PASSWORD).await.unwrap_err();

        assert!(matches!(err, GateError::AccountDisabled));
        assert_eq!(gate.session(), Session::Anonymous);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_google_sign_in() {
        let (gate, api, store) = setup();

        let session = gate.login_with_google("google-ok").await.unwrap();
        assert_eq!(session.role(), Some(UserRole::Customer));
        assert!(store.load().await.unwrap().is_some());

        let err = gate.login_with_google("forged").await.unwrap_err();
        assert!(matches!(err, GateError::Authentication(_)));
        assert_eq!(gate.session(), session);

        let err = gate.login_with_google("  ").await.unwrap_err();
        assert!(matches!(err, GateError::Validation(_)));
        assert_eq!(count(&api.calls.google), 2);
    }

    #[tokio::test]
    async fn test_accept_callback_validates_before_storing() {
        let (gate, api, store) = setup();
        let fran = with_freelancer(&api);

        let err = gate
            .accept_callback(Credentials::new(AccessToken::new("forged")))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Authentication(_)));
        assert!(store.load().await.unwrap().is_none());

        let credentials = api.issue(&fran);
        let session = gate.accept_callback(credentials.clone()).await.unwrap();
        assert_eq!(session.user(), Some(&fran));
        assert_eq!(store.load().await.unwrap(), Some(credentials));
    }

    #[tokio::test]
    async fn test_register_with_tokens() {
        let (gate, api, store) = setup();

        let session = gate
            .register("new@example.com", "long enough", UserRole::Freelancer)
            .await
            .unwrap();

        assert_eq!(session.role(), Some(UserRole::Freelancer));
        assert_eq!(count(&api.calls.login), 0);
        assert!(store.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_register_user_only_signs_in_afterwards() {
        let (gate, api, _store) = setup();
        api.register_user_only.store(true, Ordering::SeqCst);

        let session = gate
            .register("new@example.com", "long enough", UserRole::Customer)
            .await
            .unwrap();

        assert_eq!(session.role(), Some(UserRole::Customer));
        assert_eq!(count(&api.calls.register), 1);
        assert_eq!(count(&api.calls.login), 1);
    }

    #[tokio::test]
    async fn test_register_rejections() {
        let (gate, api, _store) = setup();
        with_freelancer(&api);

        let err = gate
            .register("boss@example.com", "long enough", UserRole::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Validation(_)));

        let err = gate
            .register("new@example.com", "short", UserRole::Customer)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Validation(_)));
        assert_eq!(count(&api.calls.register), 0);

        let err = gate
            .register(FREELANCER_EMAIL, "long enough", UserRole::Freelancer)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Email already registered");
    }
}

// =============================================================================
// Sign out and races
// =============================================================================

mod sign_out_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_logout_then_fresh_hydrate_is_anonymous() {
        let (gate, api, store) = setup();
        with_freelancer(&api);

        gate.login(FREELANCER_EMAIL, PASSWORD).await.unwrap();
        gate.logout().await;

        assert_eq!(gate.session(), Session::Anonymous);
        assert!(store.load().await.unwrap().is_none());
        assert_eq!(count(&api.calls.logout), 1);
        assert_eq!(gate.hydrate().await, Session::Anonymous);

        // A new gate over the same store starts anonymous too
        let fresh = gate_with(&api, &store);
        let session = fresh.hydrate().await;
        assert_eq!(session, Session::Anonymous);
        assert!(session.user().is_none());
        assert_eq!(count(&api.calls.me), 0);
    }

    #[tokio::test]
    async fn test_remote_logout_failure_still_signs_out() {
        let (gate, api, store) = setup();
        with_freelancer(&api);
        api.logout_fails.store(true, Ordering::SeqCst);

        gate.login(FREELANCER_EMAIL, PASSWORD).await.unwrap();
        gate.logout().await;

        assert_eq!(gate.session(), Session::Anonymous);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_while_login_pending_wins() {
        let (gate, api, store) = setup();
        with_freelancer(&api);
        gate.hydrate().await;
        let hold = api.hold_logins();

        let login = tokio::spawn({
            let gate = gate.clone();
            async move { gate.login(FREELANCER_EMAIL, PASSWORD).await }
        });
        api.login_entered.notified().await;

        gate.logout().await;
        hold.notify_one();

        let result = login.await.unwrap();
        assert!(matches!(result, Err(GateError::Superseded)));
        assert_eq!(gate.session(), Session::Anonymous);
        assert!(store.load().await.unwrap().is_none());
        assert_eq!(gate.authorize(&[]), AccessDecision::DenyUnauthenticated);
    }

    #[tokio::test]
    async fn test_logout_joined_with_pending_login() {
        let (gate, api, store) = setup();
        with_freelancer(&api);
        let hold = api.hold_logins();

        let (result, ()) = tokio::join!(gate.login(FREELANCER_EMAIL, PASSWORD), async {
            api.login_entered.notified().await;
            gate.logout().await;
            hold.notify_one();
        });

        assert!(result.is_err());
        assert_eq!(gate.session(), Session::Anonymous);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_during_hydration_discards_its_result() {
        let (gate, api, store) = setup();
        let fran = with_freelancer(&api);
        store.save(&api.issue(&fran)).await.unwrap();
        let hold = api.hold_me();

        let hydration = tokio::spawn({
            let gate = gate.clone();
            async move { gate.hydrate().await }
        });
        api.me_entered.notified().await;

        gate.logout().await;
        hold.notify_one();

        assert_eq!(hydration.await.unwrap(), Session::Anonymous);
        assert_eq!(gate.session(), Session::Anonymous);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_observe_each_replacement() {
        let (gate, api, _store) = setup();
        with_freelancer(&api);
        let mut rx = gate.subscribe();
        assert!(rx.borrow().is_loading());

        gate.login(FREELANCER_EMAIL, PASSWORD).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().role(), Some(UserRole::Freelancer));

        gate.logout().await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Session::Anonymous);
    }
}

// =============================================================================
// Refresh
// =============================================================================

mod refresh_tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_rotates_credentials() {
        let (gate, api, store) = setup();
        let fran = with_freelancer(&api);
        let before = gate.login(FREELANCER_EMAIL, PASSWORD).await.unwrap();

        let after = gate.refresh().await.unwrap();

        assert_eq!(after.user(), Some(&fran));
        assert_ne!(after.token(), before.token());
        let stored = store.load().await.unwrap().unwrap();
        assert_eq!(Some(&stored.access_token), after.token());
        assert!(stored.can_refresh());
    }

    #[tokio::test]
    async fn test_rejected_refresh_signs_out() {
        let (gate, api, store) = setup();
        with_freelancer(&api);
        gate.login(FREELANCER_EMAIL, PASSWORD).await.unwrap();
        api.revoke_all();

        let err = gate.refresh().await.unwrap_err();

        assert!(err.clears_session());
        assert_eq!(gate.session(), Session::Anonymous);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_refresh_keeps_session() {
        let (gate, api, store) = setup();
        with_freelancer(&api);
        let session = gate.login(FREELANCER_EMAIL, PASSWORD).await.unwrap();
        api.refresh_unreachable.store(true, Ordering::SeqCst);

        let err = gate.refresh().await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(gate.session(), session);
        assert!(store.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_refresh_without_credentials() {
        let (gate, api, _store) = setup();
        gate.hydrate().await;

        let err = gate.refresh().await.unwrap_err();
        assert!(matches!(err, GateError::NotAuthenticated));
        assert_eq!(count(&api.calls.refresh), 0);
    }
}
