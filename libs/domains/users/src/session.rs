//! Explicit session context.
//!
//! A [`SessionHandle`] is created once by the binary and passed to every client that
//! needs credentials. It starts empty, is filled on login (or when a stored token is
//! resumed) and emptied on logout.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::models::AuthUser;

/// An authenticated session: who is signed in and the bearer token to present
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user: AuthUser,
    token: String,
}

impl Session {
    pub fn new(user: AuthUser, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Shared handle to the current session, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a session, replacing any previous one
    pub fn start(&self, user: AuthUser, token: impl Into<String>) {
        let session = Session::new(user, token);
        tracing::info!(user_id = %session.user.id, "Session started");
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// End the session, returning the user that was signed in
    pub fn end(&self) -> Option<AuthUser> {
        let previous = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = &previous {
            tracing::info!(user_id = %session.user.id, "Session ended");
        }
        previous.map(|session| session.user)
    }

    pub fn is_active(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.current().map(|session| session.user)
    }

    pub fn current(&self) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `Authorization` header value for the active session
    pub fn bearer(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| format!("Bearer {}", session.token))
    }
}
