//! Access Policy
//!
//! One decision function shared by every route guard, plus the static
//! role-to-route table it consults.

use derive_more::Display;

use crate::domain::entity::session::Session;
use crate::domain::value_object::user_role::UserRole;

/// Outcome of [`authorize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AccessDecision {
    /// Hydration has not resolved; callers must not redirect yet
    #[display("pending")]
    Pending,
    #[display("deny_unauthenticated")]
    DenyUnauthenticated,
    /// Signed in, but the role is not in the required set
    #[display("deny_wrong_role")]
    DenyWrongRole,
    #[display("allow")]
    Allow,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// Decide whether `session` may enter a view requiring one of `required`.
///
/// An empty `required` set admits any signed-in user.
pub fn authorize(session: &Session, required: &[UserRole]) -> AccessDecision {
    match session {
        Session::Loading => AccessDecision::Pending,
        Session::Anonymous => AccessDecision::DenyUnauthenticated,
        Session::Authenticated { user, .. } => {
            if required.is_empty() || required.contains(&user.role) {
                AccessDecision::Allow
            } else {
                AccessDecision::DenyWrongRole
            }
        }
    }
}

/// A protected route prefix and the roles allowed under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub prefix: String,
    pub roles: Vec<UserRole>,
}

impl RouteRule {
    pub fn new(prefix: impl Into<String>, roles: impl IntoIterator<Item = UserRole>) -> Self {
        Self {
            prefix: normalize(&prefix.into()),
            roles: roles.into_iter().collect(),
        }
    }

    /// Segment-boundary prefix match: `/admin` covers `/admin/users`
    /// but not `/administrator`.
    pub fn covers(&self, path: &str) -> bool {
        let path = normalize(path);
        if self.prefix == "/" {
            return true;
        }
        path == self.prefix
            || path
                .strip_prefix(self.prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Role → route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
}

impl Default for RoutePolicy {
    /// Each dashboard is reserved for its own role.
    fn default() -> Self {
        Self::new(vec![
            RouteRule::new("/admin", [UserRole::Admin]),
            RouteRule::new("/moderator", [UserRole::Moderator]),
            RouteRule::new("/customer", [UserRole::Customer]),
            RouteRule::new("/freelancer", [UserRole::Freelancer]),
        ])
    }
}

impl RoutePolicy {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Roles required for `path`, from the longest matching prefix.
    ///
    /// `None` means no rule covers the path and it is public.
    pub fn required_roles(&self, path: &str) -> Option<&[UserRole]> {
        let path = strip_query(path);
        self.rules
            .iter()
            .filter(|rule| rule.covers(path))
            .max_by_key(|rule| rule.prefix.len())
            .map(|rule| rule.roles.as_slice())
    }

    pub fn default_route(&self, role: UserRole) -> &'static str {
        role.default_route()
    }

    /// Prefixes `role` may enter
    pub fn prefixes_for(&self, role: UserRole) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|rule| rule.roles.contains(&role))
            .map(|rule| rule.prefix.as_str())
            .collect()
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim();
    let with_slash = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };
    if with_slash.len() > 1 {
        with_slash.trim_end_matches('/').to_string()
    } else {
        with_slash
    }
}
