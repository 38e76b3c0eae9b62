use super::{AuthError, AuthProvider, AuthResult};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use folio_core::models::Session;
use std::collections::HashMap;

/// In-process credential table for tests and offline editing
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    accounts: HashMap<String, String>,
}

impl StaticAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.accounts
            .insert(email.into().to_lowercase(), password.into());
        self
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let email = email.trim().to_lowercase();
        match self.accounts.get(&email) {
            Some(expected) if expected == password => Ok(Session {
                uid: format!("static-{}", email),
                id_token: format!("static-token-{}", email),
                refresh_token: String::new(),
                expires_at: Utc::now() + Duration::hours(1),
                email,
            }),
            _ => Err(AuthError::Rejected("Invalid email or password".to_string())),
        }
    }

    async fn send_password_reset(&self, email: &str) -> AuthResult<()> {
        if self.accounts.contains_key(&email.trim().to_lowercase()) {
            tracing::info!(email = %email, "Password reset requested");
            Ok(())
        } else {
            Err(AuthError::Rejected("No account exists for this email".to_string()))
        }
    }
}
