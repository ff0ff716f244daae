//! Session token holder backed by the `accessToken` cookie.

use crate::token::{self, SESSION_COOKIE};
use std::sync::{Arc, RwLock};

/// Shared, mutable session. Clones see the same token.
#[derive(Clone, Debug, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_token(token);
        session
    }

    /// Restore a session from a `Cookie` header (`a=1; accessToken=...`).
    pub fn from_cookie_header(header: &str) -> Self {
        match cookie_value(header, SESSION_COOKIE) {
            Some(token) => Self::with_token(token),
            None => Self::new(),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Store a freshly issued token. Empty tokens clear the session.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        let mut slot = self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = (!token.is_empty()).then_some(token);
    }

    pub fn clear(&self) {
        let mut slot = self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.take().is_some() {
            debug!("Session cleared");
        }
    }

    /// `Set-Cookie` value persisting the current token, if any.
    pub fn set_cookie_header(&self) -> Option<String> {
        self.token()
            .map(|token| format!("{}={}; Path=/", SESSION_COOKIE, token))
    }

    pub fn username(&self) -> Option<String> {
        token::username(&self.token()?)
    }

    pub fn user_id(&self) -> Option<String> {
        token::user_id(&self.token()?)
    }

    pub fn is_admin(&self) -> bool {
        self.token().is_some_and(|t| token::is_admin(&t))
    }
}

/// Value of cookie `name` in a `Cookie` header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then_some(value)
        })
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::unsigned_token;

    #[test]
    fn test_from_cookie_header() {
        let session = Session::from_cookie_header("theme=dark; accessToken=abc.def.ghi; lang=en");
        assert_eq!(session.token().as_deref(), Some("abc.def.ghi"));

        assert!(!Session::from_cookie_header("theme=dark").is_authenticated());
        assert!(!Session::from_cookie_header("accessToken=").is_authenticated());
    }

    #[test]
    fn test_clones_share_token() {
        let session = Session::new();
        let other = session.clone();
        session.set_token("t");
        assert_eq!(other.token().as_deref(), Some("t"));

        other.clear();
        assert!(!session.is_authenticated());
        assert_eq!(session.set_cookie_header(), None);
    }

    #[test]
    fn test_set_cookie_header() {
        let session = Session::with_token("a.b.c");
        assert_eq!(
            session.set_cookie_header().as_deref(),
            Some("accessToken=a.b.c; Path=/")
        );
    }

    #[test]
    fn test_claims_through_session() {
        let session = Session::with_token(unsigned_token(
            r#"{"sub":"ronan","userId":"u1","roles":"ADMIN"}"#,
        ));
        assert_eq!(session.username().as_deref(), Some("ronan"));
        assert_eq!(session.user_id().as_deref(), Some("u1"));
        assert!(session.is_admin());
        assert!(!Session::new().is_admin());
    }
}
