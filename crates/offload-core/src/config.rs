//! Worker configuration

use std::time::Duration;

use crate::constants::{
    DEFAULT_JOB_COUNT, DEFAULT_WAITING_LIST_SIZE, MAX_JOB_COUNT, MAX_PARAM_SIZE,
    MAX_WAITING_LIST_SIZE,
};

/// Configuration for one async worker instance
///
/// All values are read once when the worker is initialized; there is no
/// runtime reconfiguration. The defaults match the canonical port
/// (2 job slots, 4 waiting-list entries, no allocation timeout).
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of job slots in the pool
    pub job_count: usize,

    /// Capacity of the blocked-caller waiting list (0 = reject immediately)
    pub waiting_list_size: usize,

    /// Upper bound on the parameter block size in bytes
    ///
    /// `initialize` rejects a parameter type larger than this, so the
    /// budget a deployment was sized for cannot be exceeded silently.
    pub max_param_size: usize,

    /// Optional timeout for the waiting-list suspension in `allocate_job`
    ///
    /// `None` waits indefinitely for a slot.
    pub allocate_timeout: Option<Duration>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            job_count: DEFAULT_JOB_COUNT,
            waiting_list_size: DEFAULT_WAITING_LIST_SIZE,
            max_param_size: MAX_PARAM_SIZE,
            allocate_timeout: None,
        }
    }
}

impl WorkerConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of job slots
    pub fn job_count(mut self, n: usize) -> Self {
        self.job_count = n;
        self
    }

    /// Set the waiting-list capacity
    pub fn waiting_list_size(mut self, n: usize) -> Self {
        self.waiting_list_size = n;
        self
    }

    /// Set the maximum parameter block size
    pub fn max_param_size(mut self, n: usize) -> Self {
        self.max_param_size = n;
        self
    }

    /// Set the allocation wait timeout
    pub fn allocate_timeout(mut self, d: Option<Duration>) -> Self {
        self.allocate_timeout = d;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.job_count == 0 {
            return Err("job_count must be at least 1");
        }
        if self.job_count > MAX_JOB_COUNT {
            return Err("job_count exceeds maximum");
        }
        if self.waiting_list_size > MAX_WAITING_LIST_SIZE {
            return Err("waiting_list_size exceeds maximum");
        }
        if self.max_param_size == 0 {
            return Err("max_param_size must be at least 1");
        }
        if self.max_param_size > MAX_PARAM_SIZE {
            return Err("max_param_size exceeds maximum");
        }
        Ok(())
    }
}
