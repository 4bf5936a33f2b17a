use thiserror::Error;

/// Error taxonomy for the consolidation engine.
///
/// Business-rule violations (too few packages, mixed customers, inactive
/// group) are reported as `Validation` with a descriptive message.
/// `PermissionDenied` is the hard access-control boundary and always carries
/// a fixed, user-presentable message.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by a transactional store commit.
#[derive(Error, Debug)]
pub enum CommitError {
    /// A linkage guard failed at commit time: a competing transaction
    /// changed a package's consolidation linkage after the pre-check.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<CommitError> for EngineError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::Conflict(msg) => EngineError::Conflict(msg),
            CommitError::NotFound(msg) => EngineError::NotFound(msg),
            CommitError::Storage(msg) => EngineError::Persistence(msg),
        }
    }
}
