use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated editor session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub email: String,
    /// Bearer token presented to the document store
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Identity written into `createdBy` when nobody is signed in
pub const ANONYMOUS_CREATOR: &str = "anonymous";

/// Creator identity for a new record.
pub fn creator_identity(session: Option<&Session>) -> String {
    session
        .map(|s| s.email.clone())
        .filter(|email| !email.is_empty())
        .unwrap_or_else(|| ANONYMOUS_CREATOR.to_string())
}
