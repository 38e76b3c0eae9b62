//! Firebase Authentication via the Identity Toolkit REST API.

use super::{AuthError, AuthProvider, AuthResult};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use folio_core::models::Session;
use folio_core::Config;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const IDENTITY_TOOLKIT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// Readable message for an Identity Toolkit error code.
///
/// Codes may carry a suffix (`TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account...`);
/// only the code itself is matched.
pub fn readable_message(code: &str) -> String {
    let code = code.split(':').next().unwrap_or(code).trim();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            "Invalid email or password".to_string()
        }
        "INVALID_EMAIL" => "Invalid email address".to_string(),
        "MISSING_PASSWORD" => "Password is required".to_string(),
        "MISSING_EMAIL" => "Email is required".to_string(),
        "USER_DISABLED" => "This account has been disabled".to_string(),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => {
            "Too many attempts. Try again later".to_string()
        }
        "" => "Request failed".to_string(),
        other => other.to_string(),
    }
}

pub struct FirebaseAuth {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl FirebaseAuth {
    pub fn new(api_key: String, timeout: Duration) -> AuthResult<Self> {
        Self::with_endpoint(IDENTITY_TOOLKIT_ENDPOINT, api_key, timeout)
    }

    /// Point at a custom endpoint (auth emulator or test server)
    pub fn with_endpoint(endpoint: &str, api_key: String, timeout: Duration) -> AuthResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> AuthResult<Self> {
        let api_key = config
            .firebase_api_key
            .clone()
            .ok_or_else(|| AuthError::ConfigError("FIREBASE_API_KEY not configured".to_string()))?;
        Self::new(api_key, config.store_timeout())
    }

    async fn post(&self, method: &str, body: serde_json::Value) -> AuthResult<reqwest::Response> {
        let url = format!("{}/accounts:{}", self.endpoint, method);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let code = response
            .json::<ErrorBody>()
            .await
            .map(|b| b.error.message)
            .unwrap_or_default();
        tracing::debug!(status = status.as_u16(), code = %code, method = %method, "Auth request rejected");
        Err(AuthError::Rejected(readable_message(&code)))
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuth {
    #[tracing::instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let response = self
            .post(
                "signInWithPassword",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;

        let body: SignInResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(format!("Unreadable sign-in response: {}", e)))?;

        let lifetime = body
            .expires_in
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        tracing::info!(uid = %body.local_id, "Editor signed in");
        Ok(Session {
            uid: body.local_id,
            email: if body.email.is_empty() {
                email.to_string()
            } else {
                body.email
            },
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: Utc::now() + ChronoDuration::seconds(lifetime),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn send_password_reset(&self, email: &str) -> AuthResult<()> {
        self.post(
            "sendOobCode",
            json!({ "requestType": "PASSWORD_RESET", "email": email }),
        )
        .await?;
        tracing::info!("Password reset email requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn auth(server: &mockito::Server) -> FirebaseAuth {
        FirebaseAuth::with_endpoint(&server.url(), "web-key".to_string(), Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn error_codes_become_readable() {
        assert_eq!(readable_message("INVALID_PASSWORD"), "Invalid email or password");
        assert_eq!(
            readable_message("TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account has been temporarily disabled"),
            "Too many attempts. Try again later"
        );
        assert_eq!(readable_message("OPERATION_NOT_ALLOWED"), "OPERATION_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn sign_in_builds_a_session() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/accounts:signInWithPassword")
            .match_query(Matcher::UrlEncoded("key".into(), "web-key".into()))
            .match_body(Matcher::PartialJson(json!({
                "email": "editor@studio.no",
                "returnSecureToken": true
            })))
            .with_status(200)
            .with_body(
                r#"{"localId":"u1","email":"editor@studio.no","idToken":"id-token","refreshToken":"r","expiresIn":"3600"}"#,
            )
            .create_async()
            .await;

        let session = auth(&server)
            .sign_in("editor@studio.no", "secret")
            .await
            .unwrap();
        assert_eq!(session.uid, "u1");
        assert_eq!(session.id_token, "id-token");
        assert!(!session.is_expired(Utc::now()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn wrong_password_is_reported_readably() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/accounts:signInWithPassword")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"INVALID_LOGIN_CREDENTIALS"}}"#)
            .create_async()
            .await;

        let err = auth(&server)
            .sign_in("editor@studio.no", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "Invalid email or password");
    }

    #[tokio::test]
    async fn password_reset_requests_an_oob_code() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/accounts:sendOobCode")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({
                "requestType": "PASSWORD_RESET",
                "email": "editor@studio.no"
            })))
            .with_status(200)
            .with_body(r#"{"email":"editor@studio.no"}"#)
            .create_async()
            .await;

        auth(&server)
            .send_password_reset("editor@studio.no")
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
