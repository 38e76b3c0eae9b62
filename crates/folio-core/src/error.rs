//! Error types module
//!
//! This module provides the core error type used throughout Folio. Each crate keeps
//! its own narrow error enum (store, upload, auth, publish) and converts into
//! `AppError` at the boundary where a failure becomes a user-visible status.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a full gallery
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the editor.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "STORE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether the action can simply be retried
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the person at the panel
    fn suggested_action(&self) -> Option<&'static str>;

    /// Message shown to the editor (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Gallery full: capacity of {capacity} images reached")]
    CapacityExceeded { capacity: usize },

    #[error("{pending} upload(s) still in progress")]
    UploadsInFlight { pending: usize },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::Store(_) => (
            "STORE_ERROR",
            true,
            Some("Check the connection and save again"),
            LogLevel::Error,
        ),
        AppError::Upload(_) => (
            "UPLOAD_ERROR",
            true,
            Some("Select the file again to retry the upload"),
            LogLevel::Warn,
        ),
        AppError::Auth(_) => (
            "AUTH_ERROR",
            false,
            Some("Check the email and password"),
            LogLevel::Debug,
        ),
        AppError::InvalidInput(_) => (
            "INVALID_INPUT",
            false,
            Some("Fill in the required fields and try again"),
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            "NOT_FOUND",
            false,
            Some("Verify the record exists"),
            LogLevel::Debug,
        ),
        AppError::CapacityExceeded { .. } => (
            "CAPACITY_EXCEEDED",
            false,
            Some("Delete images to add new ones"),
            LogLevel::Warn,
        ),
        AppError::UploadsInFlight { .. } => (
            "UPLOADS_IN_FLIGHT",
            true,
            Some("Wait for the uploads to finish"),
            LogLevel::Debug,
        ),
        AppError::Timeout(_) => (
            "TIMEOUT",
            true,
            Some("Retry after a short delay"),
            LogLevel::Warn,
        ),
        AppError::Config(_) => (
            "CONFIG_ERROR",
            false,
            Some("Check the environment configuration"),
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            // Service-reported reasons are shown verbatim.
            AppError::Store(ref msg) => msg.clone(),
            AppError::Upload(ref msg) => msg.clone(),
            AppError::Auth(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::CapacityExceeded { capacity } => format!(
                "Maximum {} images reached. Delete images to add new ones.",
                capacity
            ),
            AppError::UploadsInFlight { pending } => {
                format!("Wait for {} upload(s) to finish", pending)
            }
            AppError::Timeout(_) => "timeout".to_string(),
            AppError::Config(ref msg) => msg.clone(),
        }
    }
}
