use folio_core::AppError;
use thiserror::Error;

/// Reason reported when the upload service gives nothing more specific
pub const GENERIC_FAILURE: &str = "Upload failed";

/// Reason reported when an exchange exceeds the per-upload timeout
pub const TIMEOUT_REASON: &str = "timeout";

/// Upload operation errors
#[derive(Debug, Error)]
pub enum UploadError {
    /// The service answered and did not return a URL.
    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Upload timed out")]
    Timeout,

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl UploadError {
    /// Reason recorded on the failed upload entry
    pub fn reason(&self) -> String {
        match self {
            UploadError::Rejected(reason) => reason.clone(),
            UploadError::Transport(_) => GENERIC_FAILURE.to_string(),
            UploadError::Timeout => TIMEOUT_REASON.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Timeout => AppError::Timeout("upload".to_string()),
            UploadError::ConfigError(msg) => AppError::Config(msg),
            UploadError::InvalidFile(msg) => AppError::InvalidInput(msg),
            other => AppError::Upload(other.reason()),
        }
    }
}

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;
