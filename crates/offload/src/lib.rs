//! # offload - Async worker for blocking native operations
//!
//! A fixed-capacity job-queue subsystem for running blocking work
//! (cryptographic primitives, radio driver calls, any long foreign
//! operation) on a dedicated lower-priority worker thread instead of a
//! foreground thread.
//!
//! ## Model
//!
//! - **Job slot pool**: a fixed array of reusable job records, each able
//!   to hold one operation's parameter block and result.
//! - **Waiting list**: a fixed-capacity FIFO of callers blocked because
//!   no slot was free; one waiter is woken per freed slot.
//! - **Worker task**: a single background thread that executes submitted
//!   jobs in order and wakes the owning caller on completion.
//!
//! A caller allocates a slot, fills in parameters, submits, and sleeps
//! until the worker finishes. The action's result and error code travel
//! inside the parameter block (0 = success, negative = domain error);
//! coordinator errors (no slot, timeout, misuse) are `WorkerError`s and
//! never mix with action failures, so a caller can always tell "the
//! system was busy" apart from "the operation ran and failed".
//!
//! ## Quick Start
//!
//! ```ignore
//! use offload::{AsyncWorker, Priority, WorkerConfig};
//!
//! #[derive(Default)]
//! struct DigestParams {
//!     input: Vec<u8>,
//!     digest: u64,
//!     result: i32,
//! }
//!
//! fn digest_action(p: &mut DigestParams) {
//!     p.digest = expensive_digest(&p.input);
//!     p.result = 0;
//! }
//!
//! let worker: AsyncWorker<DigestParams> = AsyncWorker::new(WorkerConfig::default());
//! worker.initialize("offload-sec", 128 * 1024, Priority::Low)?;
//!
//! let job = worker.allocate_job()?;
//! let out = worker.submit_job(&job, digest_action, DigestParams {
//!     input: b"hello".to_vec(),
//!     ..Default::default()
//! })?;
//! assert_eq!(out.result, 0);
//! worker.release_job(job)?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Caller Threads                      │
//! │     allocate_job / submit_job / release_job         │
//! └─────────────────────────────────────────────────────┘
//!          │ no free slot            │ submit
//!          ▼                         ▼
//!    ┌───────────┐            ┌─────────────┐
//!    │  Waiting  │            │  Pending    │
//!    │   List    │            │  FIFO       │
//!    └───────────┘            └─────────────┘
//!          ▲ wake one                │ pop
//!          │ per freed slot          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                  Worker Task                        │
//! │   SUBMITTED → RUNNING → action() → DONE → signal    │
//! └─────────────────────────────────────────────────────┘
//! ```

// Re-export core types
pub use offload_core::{
    constants, JobId, JobState, Priority, StartError, WorkerConfig, WorkerError, WorkerResult,
};

// Re-export the log macros and their configuration surface
pub use offload_core::{kdebug, kerror, kinfo, kwarn};
pub use offload_core::kprint::{init as init_logging, set_flush_enabled, set_log_level, LogLevel};

// Re-export env utilities
pub use offload_core::{env_get, env_get_bool, env_get_opt, env_get_str};

// Re-export runtime types
pub use offload_runtime::{Action, AsyncWorker, JobHandle, PlatformSignal, Signal};
