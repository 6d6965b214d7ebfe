//! Job slot pool
//!
//! Fixed-size array of reusable job records plus the waiting list of
//! blocked allocators. All mutation happens under the coordinator's
//! spinlock; this module only provides the bookkeeping.
//!
//! A record's payload (`action` + `params`) belongs to the owning
//! caller while ALLOCATED or DONE and to the worker task while
//! SUBMITTED or RUNNING. The pool enforces the claim side of that
//! contract: a slot is only ever handed to one caller at a time, and
//! lookups require the owner's token.

use std::sync::Arc;

use offload_core::{JobId, JobState, WaitingList, WorkerError, WorkerResult};

use crate::signal::PlatformSignal;

/// The operation a job executes, opaque to the coordinator
///
/// Reads its inputs from the parameter block and writes its result
/// (and error code, if any) back into it.
pub type Action<P> = fn(&mut P);

/// Capability to operate on one allocated job slot
///
/// Returned by `allocate_job`, consumed by `release_job`. Deliberately
/// neither `Copy` nor `Clone`: exactly one handle per allocation exists.
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    token: u64,
}

impl JobHandle {
    pub(crate) fn new(id: JobId, token: u64) -> Self {
        Self { id, token }
    }

    /// Slot index this handle refers to
    #[inline]
    pub fn id(&self) -> JobId {
        self.id
    }

    #[inline]
    pub(crate) fn token(&self) -> u64 {
        self.token
    }
}

/// One reusable job slot
pub(crate) struct JobRecord<P> {
    /// Lifecycle state, guarded by the pool lock
    pub(crate) state: JobState,

    /// Allocation token of the owning caller (0 = none)
    pub(crate) owner: u64,

    /// Action to run, set at submission
    pub(crate) action: Option<Action<P>>,

    /// Parameter block; moves caller -> worker -> caller, never shared
    pub(crate) params: Option<P>,

    /// Completion signal the owning caller blocks on
    ///
    /// Created once and reused for the slot's lifetime; posted exactly
    /// once per submission.
    pub(crate) done: Arc<PlatformSignal>,
}

impl<P> JobRecord<P> {
    fn new() -> Self {
        Self {
            state: JobState::Free,
            owner: 0,
            action: None,
            params: None,
            done: Arc::new(PlatformSignal::new()),
        }
    }

    /// Reset to FREE, dropping any leftover payload
    pub(crate) fn reset(&mut self) {
        self.state = JobState::Free;
        self.owner = 0;
        self.action = None;
        self.params = None;
    }
}

/// Slot array + waiting list, shared mutable state of one worker
pub(crate) struct JobPool<P> {
    records: Vec<JobRecord<P>>,
    pub(crate) waiters: WaitingList<PlatformSignal>,
}

impl<P> JobPool<P> {
    pub(crate) fn new(job_count: usize, waiting_list_size: usize) -> Self {
        let mut records = Vec::with_capacity(job_count);
        for _ in 0..job_count {
            records.push(JobRecord::new());
        }
        Self {
            records,
            waiters: WaitingList::new(waiting_list_size),
        }
    }

    /// Scan for a FREE slot and claim it for `token`
    ///
    /// Slots are scanned in index order so the claim is deterministic.
    /// Must run under the pool lock; the scan-and-claim is what the
    /// lock makes atomic.
    pub(crate) fn claim_free(&mut self, token: u64) -> Option<JobId> {
        for (idx, rec) in self.records.iter_mut().enumerate() {
            if rec.state.is_free() {
                rec.state = JobState::Allocated;
                rec.owner = token;
                return Some(JobId::new(idx as u32));
            }
        }
        None
    }

    /// Look up a record through its owner's handle
    ///
    /// Fails with `JobNotFound` when the id is out of range or the
    /// token does not match the current owner (stale or foreign handle).
    pub(crate) fn record_mut(&mut self, handle: &JobHandle) -> WorkerResult<&mut JobRecord<P>> {
        let rec = self
            .records
            .get_mut(handle.id().as_usize())
            .ok_or(WorkerError::JobNotFound)?;
        if rec.owner == 0 || rec.owner != handle.token() {
            return Err(WorkerError::JobNotFound);
        }
        Ok(rec)
    }

    /// Worker-side lookup by id, no token check
    ///
    /// Ids reaching the worker come from the pending queue, which only
    /// ever holds ids of submitted records.
    pub(crate) fn record_by_id_mut(&mut self, id: JobId) -> &mut JobRecord<P> {
        &mut self.records[id.as_usize()]
    }

    /// Number of FREE slots
    pub(crate) fn free_count(&self) -> usize {
        self.records.iter().filter(|r| r.state.is_free()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_in_index_order() {
        let mut pool: JobPool<u32> = JobPool::new(3, 0);
        assert_eq!(pool.free_count(), 3);

        let a = pool.claim_free(1).unwrap();
        let b = pool.claim_free(2).unwrap();
        assert_eq!(a.as_u32(), 0);
        assert_eq!(b.as_u32(), 1);
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn test_claim_exhaustion() {
        let mut pool: JobPool<u32> = JobPool::new(1, 0);
        assert!(pool.claim_free(1).is_some());
        assert!(pool.claim_free(2).is_none());
    }

    #[test]
    fn test_record_mut_requires_matching_token() {
        let mut pool: JobPool<u32> = JobPool::new(1, 0);
        let id = pool.claim_free(42).unwrap();

        let good = JobHandle::new(id, 42);
        let stale = JobHandle::new(id, 41);
        assert!(pool.record_mut(&good).is_ok());
        assert!(matches!(
            pool.record_mut(&stale),
            Err(WorkerError::JobNotFound)
        ));

        let out_of_range = JobHandle::new(JobId::new(9), 42);
        assert!(matches!(
            pool.record_mut(&out_of_range),
            Err(WorkerError::JobNotFound)
        ));
    }

    #[test]
    fn test_reset_frees_slot() {
        let mut pool: JobPool<u32> = JobPool::new(1, 0);
        let id = pool.claim_free(7).unwrap();
        pool.record_by_id_mut(id).params = Some(99);
        pool.record_by_id_mut(id).reset();

        assert_eq!(pool.free_count(), 1);
        // A released slot must not leak the previous owner's payload
        assert!(pool.record_by_id_mut(id).params.is_none());
        let reclaimed = pool.claim_free(8).unwrap();
        assert_eq!(reclaimed, id);
    }
}
