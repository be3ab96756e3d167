use thiserror::Error;

/// Errors produced by blob fetching and audio recording operations.
///
/// Every failure is terminal for the call that produced it; nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("{0}")]
    RetrievalFailed(String),

    #[error("{0}")]
    DecodeFailed(String),

    #[error("permission denied")]
    PermissionDenied,

    #[error("device not available: {0}")]
    DeviceNotAvailable(String),

    #[error("unsupported mime type: {0}")]
    UnsupportedMimeType(String),

    #[error("a recording session is already active")]
    AlreadyRecording,

    #[error("MediaRecorder not initialized")]
    NotInitialized,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("operation aborted")]
    Aborted,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}
