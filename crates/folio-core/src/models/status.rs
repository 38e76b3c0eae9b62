use serde::Serialize;

/// Outcome of one user-triggered operation (sign-in, save, submit, ...).
///
/// Exactly one state at a time; a status can never be both succeeded and failed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum OperationStatus {
    #[default]
    Idle,
    InProgress,
    Succeeded(String),
    Failed(String),
}

impl OperationStatus {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, OperationStatus::InProgress)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            OperationStatus::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn success(&self) -> Option<&str> {
        match self {
            OperationStatus::Succeeded(message) => Some(message),
            _ => None,
        }
    }
}
