//! Fixed-capacity waiting list of blocked callers
//!
//! When `allocate_job` finds no free slot, the caller parks itself here
//! and suspends on its own wake signal. `release_job` pops the entry at
//! the front, so waiters are woken in arrival order.
//!
//! The list never grows past its configured capacity: a caller that
//! cannot even queue gets a `WaitingListFull` error instead of blocking
//! on insertion. Entries are `Arc`s so a timed-out caller can remove its
//! own entry by pointer identity even after the queue has shifted.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::{WorkerError, WorkerResult};

/// FIFO of waiter signals with a hard capacity
///
/// `W` is the per-caller wake primitive. The list only stores and hands
/// back `Arc<W>` handles; waking is the caller's business, so this type
/// stays platform-agnostic.
pub struct WaitingList<W> {
    entries: VecDeque<Arc<W>>,
    capacity: usize,
}

impl<W> WaitingList<W> {
    /// Create a list that holds at most `capacity` waiters
    pub fn new(capacity: usize) -> Self {
        Self {
            // Pre-allocate to capacity so pushes never reallocate
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a waiter at the tail
    ///
    /// Fails with `WaitingListFull` when at capacity; never blocks.
    pub fn push(&mut self, waiter: &Arc<W>) -> WorkerResult<()> {
        if self.entries.len() >= self.capacity {
            return Err(WorkerError::WaitingListFull);
        }
        self.entries.push_back(Arc::clone(waiter));
        Ok(())
    }

    /// Take the longest-waiting entry, if any
    pub fn pop_front(&mut self) -> Option<Arc<W>> {
        self.entries.pop_front()
    }

    /// Remove a specific waiter by pointer identity
    ///
    /// Returns false if the entry was already popped (the waiter was
    /// signaled concurrently), in which case the caller owes a retry.
    pub fn remove(&mut self, waiter: &Arc<W>) -> bool {
        if let Some(pos) = self.entries.iter().position(|e| Arc::ptr_eq(e, waiter)) {
            self.entries.remove(pos);
            true
        } else {
            false
        }
    }

    /// Number of waiters currently queued
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no waiters are queued
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of waiters
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The list never touches the waiter itself, so a unit works fine here.
    type DummyWaiter = ();

    #[test]
    fn test_fifo_order() {
        let mut list: WaitingList<DummyWaiter> = WaitingList::new(4);
        let a = Arc::new(());
        let b = Arc::new(());
        let c = Arc::new(());

        list.push(&a).unwrap();
        list.push(&b).unwrap();
        list.push(&c).unwrap();
        assert_eq!(list.len(), 3);

        assert!(Arc::ptr_eq(&list.pop_front().unwrap(), &a));
        assert!(Arc::ptr_eq(&list.pop_front().unwrap(), &b));
        assert!(Arc::ptr_eq(&list.pop_front().unwrap(), &c));
        assert!(list.pop_front().is_none());
    }

    #[test]
    fn test_capacity_enforced() {
        let mut list: WaitingList<DummyWaiter> = WaitingList::new(2);
        let a = Arc::new(());
        let b = Arc::new(());
        let c = Arc::new(());

        list.push(&a).unwrap();
        list.push(&b).unwrap();
        assert!(matches!(list.push(&c), Err(WorkerError::WaitingListFull)));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_zero_capacity_rejects() {
        let mut list: WaitingList<DummyWaiter> = WaitingList::new(0);
        let a = Arc::new(());
        assert!(matches!(list.push(&a), Err(WorkerError::WaitingListFull)));
    }

    #[test]
    fn test_remove_by_identity() {
        let mut list: WaitingList<DummyWaiter> = WaitingList::new(4);
        let a = Arc::new(());
        let b = Arc::new(());

        list.push(&a).unwrap();
        list.push(&b).unwrap();

        // Removing the middle entry leaves the rest in order
        assert!(list.remove(&a));
        assert!(!list.remove(&a)); // already gone
        assert_eq!(list.len(), 1);
        assert!(Arc::ptr_eq(&list.pop_front().unwrap(), &b));
    }

    #[test]
    fn test_remove_after_pop_reports_consumed() {
        let mut list: WaitingList<DummyWaiter> = WaitingList::new(4);
        let a = Arc::new(());
        list.push(&a).unwrap();

        // Simulates release_job winning the race against a timeout
        let popped = list.pop_front().unwrap();
        assert!(Arc::ptr_eq(&popped, &a));
        assert!(!list.remove(&a));
    }
}
