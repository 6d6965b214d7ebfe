//! # offload-runtime
//!
//! Platform-specific runtime for the offload async worker.
//!
//! ## Modules
//!
//! - `signal` - Counting wake primitive (Linux futex, condvar fallback)
//! - `task` - Worker thread spawning and priority application
//! - `pool` - Job slot pool and waiting list bookkeeping
//! - `worker` - The `AsyncWorker` coordinator and worker task loop

#![allow(dead_code)]

pub mod pool;
pub mod signal;
pub mod task;
pub mod worker;

// Re-exports for convenience
pub use pool::{Action, JobHandle};
pub use signal::{PlatformSignal, Signal};
pub use worker::AsyncWorker;
