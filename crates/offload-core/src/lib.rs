//! # offload-core
//!
//! Core types for the offload async worker subsystem.
//!
//! This crate is platform-agnostic and contains no OS-specific code.
//! All platform-specific implementations (wake signals, thread spawning,
//! the worker loop itself) are in `offload-runtime`.
//!
//! ## Modules
//!
//! - `id` - Job slot identifier type
//! - `state` - Job state machine and worker priority enums
//! - `config` - Worker configuration with validation
//! - `waitlist` - Fixed-capacity FIFO of blocked-caller signals
//! - `error` - Error types
//! - `spinlock` - Internal spinlock primitive
//! - `kprint` - Leveled stderr log macros
//! - `env` - Environment variable utilities

#![allow(dead_code)]

pub mod id;
pub mod state;
pub mod config;
pub mod waitlist;
pub mod error;
pub mod spinlock;
pub mod kprint;
pub mod env;

// Re-exports for convenience
pub use id::JobId;
pub use state::{JobState, Priority};
pub use config::WorkerConfig;
pub use waitlist::WaitingList;
pub use error::{StartError, WorkerError, WorkerResult};
pub use spinlock::SpinLock;
pub use env::{env_get, env_get_bool, env_get_opt, env_get_str};

/// Platform limits consumed by configuration validation
pub mod constants {
    /// Maximum job slots per worker instance
    pub const MAX_JOB_COUNT: usize = 64;

    /// Maximum waiting-list capacity per worker instance
    pub const MAX_WAITING_LIST_SIZE: usize = 256;

    /// Maximum size of a job's parameter block in bytes
    pub const MAX_PARAM_SIZE: usize = 64 * 1024;

    /// Default job slot count (the canonical port uses 2)
    pub const DEFAULT_JOB_COUNT: usize = 2;

    /// Default waiting-list capacity (the canonical port uses 4)
    pub const DEFAULT_WAITING_LIST_SIZE: usize = 4;

    /// Default worker thread stack size
    pub const DEFAULT_WORKER_STACK_SIZE: usize = 128 * 1024;

    /// Minimum worker thread stack size accepted by `initialize`
    pub const MIN_WORKER_STACK_SIZE: usize = 16 * 1024;

    /// No job sentinel value
    pub const JOB_NONE: u32 = u32::MAX;
}
