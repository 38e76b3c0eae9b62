//! Configuration module
//!
//! Settings for the document store, the upload service, the auth service and the
//! gallery sizes, read from the environment (a `.env` file is honoured).

use std::env;
use std::time::Duration;

use crate::store_types::StoreBackend;

const DEFAULT_UPLOAD_URL: &str = "https://cdn.gallinainnovations.com/upload";
const UPLOAD_TIMEOUT_SECS: u64 = 120;
const STORE_TIMEOUT_SECS: u64 = 30;
const SLIDESHOW_CAPACITY: usize = 6;

/// Folio configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    // Upload service
    pub upload_url: String,
    pub upload_timeout_secs: u64,
    // Document store
    pub store_backend: StoreBackend,
    pub store_timeout_secs: u64,
    pub firestore_project_id: Option<String>,
    pub firestore_database: String,
    // Auth service (Firebase Identity Toolkit)
    pub firebase_api_key: Option<String>,
    // Galleries
    pub slideshow_capacity: usize,
    // Editor credentials used by the CLI
    pub editor_email: Option<String>,
    pub editor_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            upload_timeout_secs: UPLOAD_TIMEOUT_SECS,
            store_backend: StoreBackend::Memory,
            store_timeout_secs: STORE_TIMEOUT_SECS,
            firestore_project_id: None,
            firestore_database: "(default)".to_string(),
            firebase_api_key: None,
            slideshow_capacity: SLIDESHOW_CAPACITY,
            editor_email: None,
            editor_password: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let store_backend = match env::var("FOLIO_STORE_BACKEND") {
            Ok(value) => value.parse::<StoreBackend>()?,
            Err(_) => StoreBackend::Firestore,
        };

        let slideshow_capacity = env::var("FOLIO_SLIDESHOW_CAPACITY")
            .unwrap_or_else(|_| SLIDESHOW_CAPACITY.to_string())
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("FOLIO_SLIDESHOW_CAPACITY must be a valid number"))?;

        let config = Config {
            environment,
            upload_url: env::var("FOLIO_UPLOAD_URL")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_URL.to_string()),
            upload_timeout_secs: env::var("FOLIO_UPLOAD_TIMEOUT_SECS")
                .unwrap_or_else(|_| UPLOAD_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(UPLOAD_TIMEOUT_SECS),
            store_backend,
            store_timeout_secs: env::var("FOLIO_STORE_TIMEOUT_SECS")
                .unwrap_or_else(|_| STORE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(STORE_TIMEOUT_SECS),
            firestore_project_id: env::var("FIRESTORE_PROJECT_ID").ok(),
            firestore_database: env::var("FIRESTORE_DATABASE")
                .unwrap_or_else(|_| "(default)".to_string()),
            firebase_api_key: env::var("FIREBASE_API_KEY").ok(),
            slideshow_capacity,
            editor_email: env::var("FOLIO_EMAIL").ok(),
            editor_password: env::var("FOLIO_PASSWORD").ok(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.upload_url.starts_with("http://") && !self.upload_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "FOLIO_UPLOAD_URL must be an http(s) URL, got {}",
                self.upload_url
            ));
        }

        if self.slideshow_capacity == 0 {
            return Err(anyhow::anyhow!(
                "FOLIO_SLIDESHOW_CAPACITY must be at least 1"
            ));
        }

        if self.upload_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "FOLIO_UPLOAD_TIMEOUT_SECS must be at least 1"
            ));
        }

        if self.store_backend == StoreBackend::Firestore {
            if self.firestore_project_id.is_none() {
                return Err(anyhow::anyhow!(
                    "FIRESTORE_PROJECT_ID must be set when FOLIO_STORE_BACKEND=firestore"
                ));
            }
            if self.firebase_api_key.is_none() {
                return Err(anyhow::anyhow!(
                    "FIREBASE_API_KEY must be set when FOLIO_STORE_BACKEND=firestore"
                ));
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}
