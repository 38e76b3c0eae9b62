use folio_core::models::OperationStatus;
use folio_core::{AppError, ErrorMetadata, LogLevel};

/// Log a failed action at the error's level and turn it into the status shown
/// to the editor.
pub fn failed(action: &str, err: impl Into<AppError>) -> OperationStatus {
    let err: AppError = err.into();
    let code = err.error_code();
    let hint = err.suggested_action().unwrap_or_default();
    match err.log_level() {
        LogLevel::Error => {
            tracing::error!(action, error_code = code, hint, error = %err, "Action failed")
        }
        LogLevel::Warn => {
            tracing::warn!(action, error_code = code, hint, error = %err, "Action failed")
        }
        LogLevel::Debug => {
            tracing::debug!(action, error_code = code, hint, error = %err, "Action failed")
        }
    }
    OperationStatus::Failed(err.client_message())
}
