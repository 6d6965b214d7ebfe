//! Error types for the offload async worker

use core::fmt;

use crate::state::JobState;

/// Result type for worker operations
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that can occur in async worker operations
///
/// All of these are reported synchronously to the calling thread.
/// Failures of the action itself are data inside the parameter block
/// (the 0 = success / negative-code convention) and never appear here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// Bad configuration or parameter at setup time
    InvalidArgument(&'static str),

    /// Worker API called before successful `initialize`
    NotInitialized,

    /// Worker already initialized
    AlreadyInitialized,

    /// Worker thread could not be started
    StartFailed(StartError),

    /// No free job slot and the waiting list is at capacity
    WaitingListFull,

    /// Timed out waiting for a job slot to free up
    Timeout,

    /// Job handle does not name a live job owned by this caller
    JobNotFound,

    /// Operation applied in the wrong job lifecycle phase
    InvalidState(JobState),
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::InvalidArgument(why) => write!(f, "invalid argument: {}", why),
            WorkerError::NotInitialized => write!(f, "worker not initialized"),
            WorkerError::AlreadyInitialized => write!(f, "worker already initialized"),
            WorkerError::StartFailed(e) => write!(f, "worker start failed: {}", e),
            WorkerError::WaitingListFull => write!(f, "waiting list full"),
            WorkerError::Timeout => write!(f, "timed out waiting for a job slot"),
            WorkerError::JobNotFound => write!(f, "job not found"),
            WorkerError::InvalidState(s) => write!(f, "invalid job state: {}", s),
        }
    }
}

impl std::error::Error for WorkerError {}

/// Worker thread startup errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    /// Failed to spawn the worker thread (resource exhaustion)
    SpawnFailed,

    /// Requested stack size below the platform minimum
    StackTooSmall,
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::SpawnFailed => write!(f, "failed to spawn worker thread"),
            StartError::StackTooSmall => write!(f, "worker stack size below minimum"),
        }
    }
}

impl From<StartError> for WorkerError {
    fn from(e: StartError) -> Self {
        WorkerError::StartFailed(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = WorkerError::WaitingListFull;
        assert_eq!(format!("{}", e), "waiting list full");

        let e = WorkerError::InvalidArgument("job_count must be at least 1");
        assert_eq!(
            format!("{}", e),
            "invalid argument: job_count must be at least 1"
        );

        let e = WorkerError::InvalidState(JobState::Running);
        assert_eq!(format!("{}", e), "invalid job state: RUNNING");
    }

    #[test]
    fn test_error_conversion() {
        let start_err = StartError::SpawnFailed;
        let worker_err: WorkerError = start_err.into();
        assert!(matches!(
            worker_err,
            WorkerError::StartFailed(StartError::SpawnFailed)
        ));
    }
}
