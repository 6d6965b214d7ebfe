//! Async worker coordinator
//!
//! The public contract of the subsystem: initialize, allocate a job
//! slot, submit a job and block until it completes, release the slot.
//! One dedicated worker thread per instance executes submitted jobs in
//! FIFO order; callers that find no free slot queue on the waiting
//! list and are woken one at a time as slots free up.
//!
//! ```text
//! caller threads                         worker task
//! ──────────────                         ───────────
//! allocate_job ──┐
//!   (scan FREE,  │ no slot: park on
//!    claim)      │ waiting list, retry
//! submit_job ────┼── pending queue ────▶ pop id
//!   (params in,  │    + work signal      SUBMITTED→RUNNING
//!    block on    │                       action(&mut params)
//!    done)     ◀─┼── done signal ─────── RUNNING→DONE, post
//! release_job ───┘
//!   (DONE→FREE, wake one waiter)
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_queue::ArrayQueue;
use offload_core::{
    kdebug, kerror, kinfo, JobId, JobState, Priority, SpinLock, WorkerConfig, WorkerError,
    WorkerResult,
};

use crate::pool::{Action, JobHandle, JobPool};
use crate::signal::{PlatformSignal, Signal};
use crate::task;

/// State shared between caller threads and the worker task
struct Shared<P> {
    config: WorkerConfig,

    /// Diagnostic name, set at initialize
    name: SpinLock<String>,

    /// Slot array + waiting list; every mutation is a short critical
    /// section under this lock, never held across an action
    pool: SpinLock<JobPool<P>>,

    /// FIFO of submitted job ids, sized to job_count
    pending: ArrayQueue<u32>,

    /// Counting wake for the worker task; one post per submission
    work: PlatformSignal,

    initialized: AtomicBool,
    shutting_down: AtomicBool,

    /// Allocation token source; 0 is reserved for "no owner"
    next_token: AtomicU64,
}

/// One async worker instance: a job slot pool, a waiting list, and a
/// dedicated worker thread
///
/// Construction is two-phase, mirroring the declare/initialize split of
/// the configuration surface: `new` sizes the pool, `initialize` starts
/// the worker thread. Every other call fails `NotInitialized` until
/// `initialize` has succeeded, and `initialize` itself fails
/// `AlreadyInitialized` the second time.
///
/// Instances are independent; a process may run several workers with
/// different pool sizes and priorities.
pub struct AsyncWorker<P: Send + 'static> {
    shared: Arc<Shared<P>>,
    thread: SpinLock<Option<JoinHandle<()>>>,
}

impl<P: Send + 'static> AsyncWorker<P> {
    /// Build the pool and waiting list; the worker thread is not yet running
    pub fn new(config: WorkerConfig) -> Self {
        let pending_depth = config.job_count.max(1);
        let shared = Arc::new(Shared {
            pool: SpinLock::new(JobPool::new(config.job_count, config.waiting_list_size)),
            pending: ArrayQueue::new(pending_depth),
            work: PlatformSignal::new(),
            name: SpinLock::new(String::new()),
            initialized: AtomicBool::new(false),
            shutting_down: AtomicBool::new(false),
            next_token: AtomicU64::new(1),
            config,
        });
        Self {
            shared,
            thread: SpinLock::new(None),
        }
    }

    /// Validate the configuration and start the worker thread
    ///
    /// `name` is the thread name used for diagnostics, `stack_size` and
    /// `priority` shape the thread. Fails `InvalidArgument` on a bad
    /// configuration (including a parameter type larger than the
    /// configured `max_param_size`), `AlreadyInitialized` on a second
    /// call, and `StartFailed` when the thread cannot be created.
    pub fn initialize(
        &self,
        name: &str,
        stack_size: usize,
        priority: Priority,
    ) -> WorkerResult<()> {
        self.shared
            .config
            .validate()
            .map_err(WorkerError::InvalidArgument)?;
        if std::mem::size_of::<P>() > self.shared.config.max_param_size {
            return Err(WorkerError::InvalidArgument(
                "parameter block exceeds max_param_size",
            ));
        }
        if name.is_empty() {
            return Err(WorkerError::InvalidArgument("worker name must not be empty"));
        }

        let mut slot = self.thread.lock();
        if slot.is_some() || self.shared.initialized.load(Ordering::Acquire) {
            return Err(WorkerError::AlreadyInitialized);
        }

        *self.shared.name.lock() = name.to_string();
        let shared = Arc::clone(&self.shared);
        let handle = task::spawn_worker(name, stack_size, priority, move || worker_loop(shared))?;
        *slot = Some(handle);
        self.shared.initialized.store(true, Ordering::Release);

        kinfo!(
            "async worker '{}' initialized: {} job slots, {} waiting-list entries, priority {}",
            name,
            self.shared.config.job_count,
            self.shared.config.waiting_list_size,
            priority
        );
        Ok(())
    }

    /// Claim a FREE job slot, queueing on the waiting list if none is free
    ///
    /// Waiters are woken in FIFO order, one per freed slot, and always
    /// re-check availability after waking: the wake is a hint, not a
    /// reservation, so a woken caller that loses the claim race re-queues
    /// at the tail. With `allocate_timeout` configured, a caller whose
    /// wait expires gets `Timeout` with its waiting-list entry cleaned up.
    pub fn allocate_job(&self) -> WorkerResult<JobHandle> {
        self.ensure_initialized()?;

        let token = self.shared.next_token.fetch_add(1, Ordering::Relaxed);
        let deadline = self
            .shared
            .config
            .allocate_timeout
            .map(|t| Instant::now() + t);
        let waiter = Arc::new(PlatformSignal::new());

        loop {
            {
                let mut pool = self.shared.pool.lock();
                // Drop our entry if a previous pass left it queued
                pool.waiters.remove(&waiter);
                if let Some(id) = pool.claim_free(token) {
                    return Ok(JobHandle::new(id, token));
                }
                pool.waiters.push(&waiter)?;
            }

            let remaining = match deadline {
                Some(d) => {
                    let left = d.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return self.allocate_timed_out(&waiter, token);
                    }
                    Some(left)
                }
                None => None,
            };

            if !waiter.wait(remaining) {
                return self.allocate_timed_out(&waiter, token);
            }
            // Woken: retry the scan
        }
    }

    /// Timeout path of `allocate_job`: unregister and fail
    fn allocate_timed_out(
        &self,
        waiter: &Arc<PlatformSignal>,
        token: u64,
    ) -> WorkerResult<JobHandle> {
        let mut pool = self.shared.pool.lock();
        if !pool.waiters.remove(waiter) {
            // Our entry was already popped: release_job chose us as the
            // waiter to wake. The freed slot may still be unclaimed, so
            // take it instead of dropping the wake on the floor.
            if let Some(id) = pool.claim_free(token) {
                return Ok(JobHandle::new(id, token));
            }
        }
        Err(WorkerError::Timeout)
    }

    /// Submit the job and block until the worker task completes it
    ///
    /// Moves `params` into the record, hands the job to the worker task
    /// and parks on the slot's completion signal. Returns the parameter
    /// block, now carrying whatever result the action wrote into it.
    /// Failures of the action itself are data inside `P`; this only
    /// errors on a bad handle or a slot that is not ALLOCATED.
    ///
    /// The calling thread is fully blocked for the duration of the job.
    /// That is the point: the blocking work happens on the worker task,
    /// at worker priority, while the caller merely sleeps.
    pub fn submit_job(
        &self,
        handle: &JobHandle,
        action: Action<P>,
        params: P,
    ) -> WorkerResult<P> {
        self.ensure_initialized()?;

        let done = {
            let mut pool = self.shared.pool.lock();
            let rec = pool.record_mut(handle)?;
            if rec.state != JobState::Allocated {
                return Err(WorkerError::InvalidState(rec.state));
            }
            rec.action = Some(action);
            rec.params = Some(params);
            rec.state = JobState::Submitted;
            Arc::clone(&rec.done)
        };

        // Sized to job_count and each slot has at most one in-flight
        // submission, so the pending queue cannot be full here.
        let pushed = self.shared.pending.push(handle.id().as_u32());
        debug_assert!(pushed.is_ok());
        self.shared.work.post();

        loop {
            {
                let mut pool = self.shared.pool.lock();
                let rec = pool.record_mut(handle)?;
                if rec.state == JobState::Done {
                    return match rec.params.take() {
                        Some(p) => Ok(p),
                        None => Err(WorkerError::InvalidState(JobState::Done)),
                    };
                }
            }
            done.wait(None);
        }
    }

    /// Return the slot to FREE and wake the longest-waiting allocator
    ///
    /// Valid from DONE (the normal path) and from ALLOCATED (a caller
    /// abandoning a slot it never submitted, e.g. because filling the
    /// parameter block failed). Consumes the handle.
    pub fn release_job(&self, handle: JobHandle) -> WorkerResult<()> {
        self.ensure_initialized()?;

        let waiter = {
            let mut pool = self.shared.pool.lock();
            let rec = pool.record_mut(&handle)?;
            if !rec.state.is_releasable() {
                return Err(WorkerError::InvalidState(rec.state));
            }
            rec.reset();
            // A released slot must always end up serviced: wake exactly
            // one waiter, FIFO by arrival
            pool.waiters.pop_front()
        };

        if let Some(w) = waiter {
            w.post();
        }
        Ok(())
    }

    /// Stop the worker thread after draining pending jobs and join it
    ///
    /// Normal operation never calls this; the worker lives for the
    /// process. It exists for tests and orderly teardown in demos.
    pub fn shutdown(self) {
        self.shared.shutting_down.store(true, Ordering::Release);
        self.shared.work.post();

        let handle = self.thread.lock().take();
        if let Some(h) = handle {
            let _ = h.join();
        }
        self.shared.initialized.store(false, Ordering::Release);
    }

    /// Diagnostic name given at initialize
    pub fn name(&self) -> String {
        self.shared.name.lock().clone()
    }

    /// Number of job slots
    pub fn job_count(&self) -> usize {
        self.shared.config.job_count
    }

    /// Number of currently FREE slots (may be stale immediately)
    pub fn free_jobs(&self) -> usize {
        self.shared.pool.lock().free_count()
    }

    /// Number of callers parked on the waiting list
    pub fn waiting_callers(&self) -> usize {
        self.shared.pool.lock().waiters.len()
    }

    /// Check whether `initialize` has succeeded
    pub fn is_initialized(&self) -> bool {
        self.shared.initialized.load(Ordering::Acquire)
    }

    #[inline]
    fn ensure_initialized(&self) -> WorkerResult<()> {
        if self.shared.initialized.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(WorkerError::NotInitialized)
        }
    }
}

/// Worker task main loop
///
/// Pop the next submitted job, run its action, signal the owner. Parks
/// on the counting work signal when the pending queue is empty, so a
/// submission posted at any moment is eventually seen.
fn worker_loop<P: Send>(shared: Arc<Shared<P>>) {
    let name = shared.name.lock().clone();
    kdebug!("worker '{}' running", name);

    loop {
        match shared.pending.pop() {
            Some(raw) => execute_job(&shared, JobId::new(raw)),
            None => {
                if shared.shutting_down.load(Ordering::Acquire) {
                    break;
                }
                shared.work.wait(None);
            }
        }
    }

    // Drain jobs submitted before the shutdown flag was seen so no
    // caller stays parked on a completion signal forever
    while let Some(raw) = shared.pending.pop() {
        execute_job(&shared, JobId::new(raw));
    }
    kdebug!("worker '{}' stopped", name);
}

/// Run one submitted job to DONE and wake its owner
fn execute_job<P: Send>(shared: &Shared<P>, id: JobId) {
    let (action, params, done) = {
        let mut pool = shared.pool.lock();
        let rec = pool.record_by_id_mut(id);
        debug_assert_eq!(rec.state, JobState::Submitted);
        rec.state = JobState::Running;
        (rec.action.take(), rec.params.take(), Arc::clone(&rec.done))
    };

    // The action runs outside the pool lock; the record's payload is
    // exclusively ours between SUBMITTED and DONE
    let params = match (action, params) {
        (Some(action), Some(mut p)) => {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| action(&mut p)));
            if outcome.is_err() {
                kerror!("job {}: action panicked, completing job anyway", id);
            }
            Some(p)
        }
        _ => {
            kerror!("job {}: submitted without action or params", id);
            None
        }
    };

    {
        let mut pool = shared.pool.lock();
        let rec = pool.record_by_id_mut(id);
        rec.params = params;
        rec.state = JobState::Done;
    }
    done.post();
}

#[cfg(test)]
mod tests {
    use super::*;
    use offload_core::constants::DEFAULT_WORKER_STACK_SIZE;
    use std::time::Duration;

    #[derive(Debug, Default, PartialEq)]
    struct EchoParams {
        input: u64,
        output: u64,
        result: i32,
    }

    fn echo_action(p: &mut EchoParams) {
        p.output = p.input;
        p.result = 0;
    }

    fn started(config: WorkerConfig) -> AsyncWorker<EchoParams> {
        let worker = AsyncWorker::new(config);
        worker
            .initialize("offload-test", DEFAULT_WORKER_STACK_SIZE, Priority::Low)
            .unwrap();
        worker
    }

    #[test]
    fn test_not_initialized() {
        let worker: AsyncWorker<EchoParams> = AsyncWorker::new(WorkerConfig::default());
        assert!(matches!(
            worker.allocate_job(),
            Err(WorkerError::NotInitialized)
        ));
        assert!(!worker.is_initialized());
    }

    #[test]
    fn test_initialize_rejects_bad_config() {
        let worker: AsyncWorker<EchoParams> = AsyncWorker::new(WorkerConfig::new().job_count(0));
        let result = worker.initialize("offload-bad", DEFAULT_WORKER_STACK_SIZE, Priority::Low);
        assert!(matches!(result, Err(WorkerError::InvalidArgument(_))));
        assert!(!worker.is_initialized());
    }

    #[test]
    fn test_initialize_rejects_oversized_params() {
        let worker: AsyncWorker<[u8; 64]> =
            AsyncWorker::new(WorkerConfig::new().max_param_size(16));
        let result = worker.initialize("offload-big", DEFAULT_WORKER_STACK_SIZE, Priority::Low);
        assert!(matches!(result, Err(WorkerError::InvalidArgument(_))));
    }

    #[test]
    fn test_double_initialize_rejected() {
        let worker = started(WorkerConfig::default());
        let again = worker.initialize("offload-again", DEFAULT_WORKER_STACK_SIZE, Priority::Low);
        assert!(matches!(again, Err(WorkerError::AlreadyInitialized)));
        worker.shutdown();
    }

    #[test]
    fn test_single_job_roundtrip() {
        let worker = started(WorkerConfig::default());

        let handle = worker.allocate_job().unwrap();
        let params = EchoParams {
            input: 42,
            ..Default::default()
        };
        let out = worker.submit_job(&handle, echo_action, params).unwrap();
        assert_eq!(out.output, 42);
        assert_eq!(out.result, 0);
        worker.release_job(handle).unwrap();

        worker.shutdown();
    }

    #[test]
    fn test_submit_twice_is_invalid_state() {
        let worker = started(WorkerConfig::default());

        let handle = worker.allocate_job().unwrap();
        let out = worker
            .submit_job(&handle, echo_action, EchoParams::default())
            .unwrap();
        assert_eq!(out.result, 0);

        // Slot is DONE now; a second submission through the same handle
        // must be rejected without disturbing the record
        let again = worker.submit_job(&handle, echo_action, EchoParams::default());
        assert!(matches!(
            again,
            Err(WorkerError::InvalidState(JobState::Done))
        ));

        worker.release_job(handle).unwrap();
        worker.shutdown();
    }

    #[test]
    fn test_release_from_allocated() {
        let worker = started(WorkerConfig::new().job_count(1));

        // Abandon path: a caller that fails to build its parameter block
        // releases the slot without ever submitting
        let handle = worker.allocate_job().unwrap();
        assert_eq!(worker.free_jobs(), 0);
        worker.release_job(handle).unwrap();
        assert_eq!(worker.free_jobs(), 1);

        // Slot is reusable afterwards
        let handle = worker.allocate_job().unwrap();
        let out = worker
            .submit_job(&handle, echo_action, EchoParams {
                input: 7,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(out.output, 7);
        worker.release_job(handle).unwrap();

        worker.shutdown();
    }

    #[test]
    fn test_allocate_timeout_bookkeeping() {
        let worker = started(
            WorkerConfig::new()
                .job_count(1)
                .waiting_list_size(4)
                .allocate_timeout(Some(Duration::from_millis(50))),
        );

        let held = worker.allocate_job().unwrap();
        let start = Instant::now();
        assert!(matches!(worker.allocate_job(), Err(WorkerError::Timeout)));
        assert!(start.elapsed() >= Duration::from_millis(40));

        // The timed-out entry must be gone, not poisoning the list
        assert_eq!(worker.waiting_callers(), 0);

        worker.release_job(held).unwrap();
        let handle = worker.allocate_job().unwrap();
        worker.release_job(handle).unwrap();

        worker.shutdown();
    }

    #[test]
    fn test_panic_containment() {
        fn exploding(_p: &mut EchoParams) {
            panic!("action blew up");
        }

        let worker = started(WorkerConfig::default());

        let handle = worker.allocate_job().unwrap();
        let out = worker
            .submit_job(&handle, exploding, EchoParams {
                input: 1,
                ..Default::default()
            })
            .unwrap();
        // The job completed; the action never got to write an output
        assert_eq!(out.output, 0);
        worker.release_job(handle).unwrap();

        // The worker task survived and still runs jobs
        let handle = worker.allocate_job().unwrap();
        let out = worker
            .submit_job(&handle, echo_action, EchoParams {
                input: 9,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(out.output, 9);
        worker.release_job(handle).unwrap();

        worker.shutdown();
    }

    #[test]
    fn test_sequential_reuse_all_slots() {
        let worker = started(WorkerConfig::new().job_count(3));

        for i in 0..30u64 {
            let handle = worker.allocate_job().unwrap();
            let out = worker
                .submit_job(&handle, echo_action, EchoParams {
                    input: i,
                    ..Default::default()
                })
                .unwrap();
            assert_eq!(out.output, i);
            worker.release_job(handle).unwrap();
        }
        assert_eq!(worker.free_jobs(), 3);

        worker.shutdown();
    }
}
