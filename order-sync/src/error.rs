use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Realtime channel errors
///
/// These never reach `OrderSyncManager` callers; the manager logs them and
/// degrades the connection state instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("Realtime transport unavailable: {0}")]
    Unavailable(String),

    #[error("Channel {0} never reached the joined state")]
    JoinFailed(String),

    #[error("Realtime transport closed")]
    Closed,
}

pub type SyncResult<T> = Result<T, SyncError>;

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::JoinFailed(_) => {
                AppError::with_message(ErrorCode::SyncJoinFailed, err.to_string())
            }
            SyncError::Unavailable(_) | SyncError::Closed => {
                AppError::with_message(ErrorCode::SyncUnavailable, err.to_string())
            }
        }
    }
}
