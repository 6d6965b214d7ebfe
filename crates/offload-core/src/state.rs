//! Job state machine and worker priority types

use core::fmt;

/// Lifecycle state of a job slot
///
/// A slot moves Free → Allocated → Submitted → Running → Done → Free.
/// The allocating caller owns the slot's payload from Allocated until
/// Submitted and again from Done until release; the worker task owns it
/// between Submitted and Done. Ownership transfers, never overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JobState {
    /// Available for allocation
    Free = 0,

    /// Claimed by a caller, being filled with parameters
    Allocated = 1,

    /// Handed to the worker task, waiting in the pending queue
    Submitted = 2,

    /// Action currently executing on the worker task
    Running = 3,

    /// Action finished, result stored, owner not yet released the slot
    Done = 4,
}

impl JobState {
    /// Check if the slot can be claimed by `allocate_job`
    #[inline]
    pub const fn is_free(&self) -> bool {
        matches!(self, JobState::Free)
    }

    /// Check if the slot's payload currently belongs to the owning caller
    #[inline]
    pub const fn is_caller_owned(&self) -> bool {
        matches!(self, JobState::Allocated | JobState::Done)
    }

    /// Check if the slot's payload currently belongs to the worker task
    #[inline]
    pub const fn is_worker_owned(&self) -> bool {
        matches!(self, JobState::Submitted | JobState::Running)
    }

    /// Check if the slot can be released back to Free
    #[inline]
    pub const fn is_releasable(&self) -> bool {
        matches!(self, JobState::Allocated | JobState::Done)
    }
}

impl From<u8> for JobState {
    fn from(v: u8) -> Self {
        match v {
            0 => JobState::Free,
            1 => JobState::Allocated,
            2 => JobState::Submitted,
            3 => JobState::Running,
            4 => JobState::Done,
            _ => JobState::Free, // Default for invalid values
        }
    }
}

impl From<JobState> for u8 {
    fn from(state: JobState) -> u8 {
        state as u8
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Free => write!(f, "FREE"),
            JobState::Allocated => write!(f, "ALLOCATED"),
            JobState::Submitted => write!(f, "SUBMITTED"),
            JobState::Running => write!(f, "RUNNING"),
            JobState::Done => write!(f, "DONE"),
        }
    }
}

/// Scheduling priority for the worker task
///
/// Expressed as a niceness delta applied to the worker thread.
/// The worker must never outrank the foreground threads that submit
/// jobs to it, so there is no level above Normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Priority {
    /// Same niceness as the spawning thread
    Normal = 0,

    /// Mildly deprioritized - default for blocking native work
    Low = 1,

    /// Heavily deprioritized - bulk/cleanup work only
    Background = 2,
}

impl Priority {
    /// Niceness delta applied to the worker thread at startup
    #[inline]
    pub const fn nice(&self) -> i32 {
        match self {
            Priority::Normal => 0,
            Priority::Low => 5,
            Priority::Background => 10,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Low
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Normal => write!(f, "NORMAL"),
            Priority::Low => write!(f, "LOW"),
            Priority::Background => write!(f, "BACKGROUND"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_ownership() {
        assert!(JobState::Free.is_free());
        assert!(!JobState::Allocated.is_free());

        assert!(JobState::Allocated.is_caller_owned());
        assert!(JobState::Done.is_caller_owned());
        assert!(!JobState::Running.is_caller_owned());

        assert!(JobState::Submitted.is_worker_owned());
        assert!(JobState::Running.is_worker_owned());
        assert!(!JobState::Done.is_worker_owned());
    }

    #[test]
    fn test_state_releasable() {
        assert!(JobState::Allocated.is_releasable());
        assert!(JobState::Done.is_releasable());
        assert!(!JobState::Free.is_releasable());
        assert!(!JobState::Submitted.is_releasable());
        assert!(!JobState::Running.is_releasable());
    }

    #[test]
    fn test_state_u8_roundtrip() {
        for s in [
            JobState::Free,
            JobState::Allocated,
            JobState::Submitted,
            JobState::Running,
            JobState::Done,
        ] {
            assert_eq!(JobState::from(u8::from(s)), s);
        }
        assert_eq!(JobState::from(250u8), JobState::Free);
    }

    #[test]
    fn test_priority_nice() {
        assert_eq!(Priority::Normal.nice(), 0);
        assert!(Priority::Low.nice() > 0);
        assert!(Priority::Background.nice() > Priority::Low.nice());
        assert_eq!(Priority::default(), Priority::Low);
    }
}
