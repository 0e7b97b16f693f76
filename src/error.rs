use thiserror::Error;

pub const NETWORK_FAILURE_MESSAGE: &str = "Network error. Please try again.";
pub const REJECTION_FALLBACK_MESSAGE: &str = "Request failed";

/// How a failed synchronization is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NetworkFailure,
    ServiceRejection,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    #[error("Transport: {0}")]
    Transport(String),
    #[error("MalformedResponse: {0}")]
    MalformedResponse(String),
    #[error("Rejected: {}", .0.as_deref().unwrap_or(REJECTION_FALLBACK_MESSAGE))]
    Rejected(Option<String>),
}

impl SyncError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SyncError::Transport(_) | SyncError::MalformedResponse(_) => FailureKind::NetworkFailure,
            SyncError::Rejected(_) => FailureKind::ServiceRejection,
        }
    }

    /// Text shown in the error notification.
    pub fn user_message(&self) -> &str {
        match self {
            SyncError::Transport(_) | SyncError::MalformedResponse(_) => NETWORK_FAILURE_MESSAGE,
            SyncError::Rejected(Some(msg)) => msg,
            SyncError::Rejected(None) => REJECTION_FALLBACK_MESSAGE,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(error: reqwest::Error) -> Self {
        SyncError::Transport(crate::unpack_error(&error))
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(error: serde_json::Error) -> Self {
        SyncError::MalformedResponse(error.to_string())
    }
}
