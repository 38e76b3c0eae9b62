//! Editor authentication.
//!
//! Signing in yields a `Session`; the current session lives in a `SessionHandle`
//! that any part of the panel can observe.

#[cfg(feature = "auth-firebase")]
pub mod firebase;
pub mod fixed;

use async_trait::async_trait;
use folio_core::models::Session;
use folio_core::AppError;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

#[cfg(feature = "auth-firebase")]
pub use firebase::FirebaseAuth;
pub use fixed::StaticAuth;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The auth service refused the request; the message is readable as is.
    #[error("{0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AuthError {
    pub fn reason(&self) -> String {
        match self {
            AuthError::Rejected(msg) => msg.clone(),
            AuthError::Transport(_) => "Could not reach the sign-in service".to_string(),
            AuthError::ConfigError(msg) => msg.clone(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::ConfigError(msg) => AppError::Config(msg),
            other => AppError::Auth(other.reason()),
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Identity service used by the editing panel
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session>;

    /// Ask the service to email a password reset link
    async fn send_password_reset(&self, email: &str) -> AuthResult<()>;

    /// Tokens are stateless for both providers, so signing out is local by default.
    async fn sign_out(&self, _session: &Session) -> AuthResult<()> {
        Ok(())
    }
}

/// Observable current session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: Arc<watch::Sender<Option<Session>>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.sender.borrow().clone()
    }

    pub fn email(&self) -> Option<String> {
        self.sender.borrow().as_ref().map(|s| s.email.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.sender.borrow().is_some()
    }

    pub fn set(&self, session: Option<Session>) {
        self.sender.send_replace(session);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn subscribers_see_session_changes() {
        let handle = SessionHandle::new();
        let mut rx = handle.subscribe();
        assert!(rx.borrow().is_none());

        handle.set(Some(Session {
            uid: "u1".to_string(),
            email: "editor@studio.no".to_string(),
            id_token: "token".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now(),
        }));
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow().as_ref().map(|s| s.email.as_str()),
            Some("editor@studio.no")
        );
        assert_eq!(handle.email().as_deref(), Some("editor@studio.no"));

        handle.set(None);
        rx.changed().await.unwrap();
        assert!(!handle.is_signed_in());
    }
}
