//! Navigation guard.
//!
//! Runs before every page navigation and decides, from the path and the
//! session token alone, whether to let the request through, redirect it,
//! or drop the session cookie. Advisory only: the backend enforces access
//! on every API call regardless of what this returns.

use crate::clock::{Clock, SystemClock};
use crate::token;
use std::fmt;
use std::sync::Arc;

/// Pages reachable without a session. Matched exactly.
pub const PUBLIC_PATHS: [&str; 3] = ["/login", "/signup", "/setup"];

/// Path fragments for asset and API requests that skip the guard.
pub const BYPASS_PATHS: [&str; 6] = [
    "/_next/",
    "/static/",
    "/api/",
    "/manifest",
    "/favicon",
    "/service-worker",
];

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";
const ADMIN_SEGMENT: &str = "/admin";

/// `Set-Cookie` value that expires the session cookie.
pub const CLEAR_SESSION_COOKIE: &str =
    "accessToken=; Path=/; Expires=Thu, 01 Jan 1970 00:00:01 GMT;";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardAction {
    Allow,
    Redirect(String),
}

impl fmt::Display for GuardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardAction::Allow => write!(f, "allow"),
            GuardAction::Redirect(to) => write!(f, "redirect {}", to),
        }
    }
}

/// Outcome of one navigation check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardOutcome {
    pub action: GuardAction,
    /// The session cookie must be cleared (token present but unusable).
    pub clear_session: bool,
}

impl GuardOutcome {
    fn allow() -> Self {
        GuardOutcome {
            action: GuardAction::Allow,
            clear_session: false,
        }
    }

    fn redirect(to: &str) -> Self {
        GuardOutcome {
            action: GuardAction::Redirect(to.to_string()),
            clear_session: false,
        }
    }

    fn clearing_session(mut self) -> Self {
        self.clear_session = true;
        self
    }

    pub fn is_allowed(&self) -> bool {
        self.action == GuardAction::Allow
    }

    /// `Set-Cookie` header value to attach to the response, if any.
    pub fn set_cookie_header(&self) -> Option<&'static str> {
        self.clear_session.then_some(CLEAR_SESSION_COOKIE)
    }
}

impl fmt::Display for GuardOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clear_session {
            write!(f, "{} (clear session)", self.action)
        } else {
            write!(f, "{}", self.action)
        }
    }
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

pub fn is_bypassed(path: &str) -> bool {
    BYPASS_PATHS.iter().any(|fragment| path.contains(fragment))
}

/// Route guard with an injectable clock for expiry checks.
#[derive(Clone)]
pub struct RouteGuard {
    clock: Arc<dyn Clock>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        RouteGuard { clock }
    }

    /// Decide what to do with a navigation to `path` carrying `token`.
    ///
    /// An empty token string counts as no token.
    pub fn evaluate(&self, path: &str, token: Option<&str>) -> GuardOutcome {
        if is_bypassed(path) {
            return GuardOutcome::allow();
        }

        let public = is_public(path);
        let token = match token.filter(|t| !t.is_empty()) {
            Some(token) => token,
            None if public => return GuardOutcome::allow(),
            None => return GuardOutcome::redirect(LOGIN_PATH),
        };

        if token::is_valid(token, self.clock.as_ref()) {
            if public {
                return GuardOutcome::redirect(HOME_PATH);
            }
            if path.contains(ADMIN_SEGMENT) && !token::is_admin(token) {
                debug!("Non-admin session refused {}", path);
                return GuardOutcome::redirect(HOME_PATH);
            }
            return GuardOutcome::allow();
        }

        debug!("Invalid session token on {}, clearing cookie", path);
        let outcome = if public {
            GuardOutcome::allow()
        } else {
            GuardOutcome::redirect(LOGIN_PATH)
        };
        outcome.clearing_session()
    }
}
