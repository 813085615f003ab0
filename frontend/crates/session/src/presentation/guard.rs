//! Route Guard
//!
//! Turns an access decision into what a view layer does next: wait,
//! redirect, or render.

use std::sync::Arc;

use crate::application::config::GateConfig;
use crate::domain::entity::session::Session;
use crate::domain::policy::{AccessDecision, RoutePolicy, authorize};
use crate::domain::value_object::user_role::UserRole;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Hydration still running; show a neutral placeholder
    Loading,
    Redirect(String),
    Render,
}

impl GuardOutcome {
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            GuardOutcome::Redirect(target) => Some(target),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    policy: Arc<RoutePolicy>,
    login_route: String,
    return_to_param: String,
}

impl RouteGuard {
    pub fn new(policy: Arc<RoutePolicy>, config: &GateConfig) -> Self {
        Self {
            policy,
            login_route: config.login_route.clone(),
            return_to_param: config.return_to_param.clone(),
        }
    }

    /// Guard a view that declares its required roles
    pub fn evaluate(
        &self,
        session: &Session,
        requested_path: &str,
        required: &[UserRole],
    ) -> GuardOutcome {
        match authorize(session, required) {
            AccessDecision::Pending => GuardOutcome::Loading,
            AccessDecision::DenyUnauthenticated => {
                GuardOutcome::Redirect(self.login_redirect(requested_path))
            }
            AccessDecision::DenyWrongRole => {
                let role = session.role().unwrap_or(UserRole::Unknown);
                tracing::debug!(role = %role, path = requested_path, "Role not allowed, redirecting");
                GuardOutcome::Redirect(self.policy.default_route(role).to_string())
            }
            AccessDecision::Allow => GuardOutcome::Render,
        }
    }

    /// Guard a path using the route policy's prefixes
    ///
    /// Paths no rule covers are public.
    pub fn evaluate_path(&self, session: &Session, path: &str) -> GuardOutcome {
        match self.policy.required_roles(path) {
            Some(required) => self.evaluate(session, path, required),
            None => GuardOutcome::Render,
        }
    }

    /// `/login?next=<encoded path>`
    pub fn login_redirect(&self, requested_path: &str) -> String {
        format!(
            "{}?{}={}",
            self.login_route,
            self.return_to_param,
            urlencoding::encode(requested_path)
        )
    }

    /// Decode the return-to value from a login page query string
    ///
    /// Only same-origin absolute paths are accepted.
    pub fn return_to(&self, query: &str) -> Option<String> {
        let query = query.trim_start_matches('?');
        let raw = query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == self.return_to_param).then_some(value)
        })?;

        let path = urlencoding::decode(&raw.replace('+', " ")).ok()?.into_owned();
        is_local_path(&path).then_some(path)
    }

    /// Where to go right after signing in
    ///
    /// The remembered path when the new session may enter it, otherwise
    /// the role's landing route.
    pub fn after_sign_in(&self, session: &Session, return_to: Option<&str>) -> String {
        let landing = session
            .role()
            .map(|role| self.policy.default_route(role))
            .unwrap_or("/");

        match return_to.filter(|path| is_local_path(path)) {
            Some(path) if self.evaluate_path(session, path) == GuardOutcome::Render => {
                path.to_string()
            }
            _ => landing.to_string(),
        }
    }
}

/// Absolute path on this origin
///
/// Browsers drop tab and newline from URLs, so `/\t/host` would become
/// `//host`. Control characters and backslashes reject the path outright.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.chars().any(|c| c.is_control() || c == '\\')
}
