//! Wake/completion signal primitive
//!
//! Counting semaphore semantics: every `post` is remembered, so a post
//! delivered before the waiter arrives is never lost. This is what lets
//! the worker task complete a job before its owner starts waiting, and
//! what lets `release_job` wake a waiter that has not parked yet.
//!
//! `post` never blocks and is callable from any thread, including from
//! inside completion callbacks running on the worker task itself.

use std::time::Duration;

/// Counting wake primitive for one waiter
///
/// Used two ways: as a job's completion signal (the owning caller waits,
/// the worker task posts) and as a waiting-list entry (the blocked
/// allocator waits, `release_job` posts).
pub trait Signal: Send + Sync {
    /// Block until a post is consumed or the timeout elapses
    ///
    /// Returns `true` if a post was consumed, `false` on timeout.
    /// Spurious returns are possible on some platforms only in the
    /// `false` case; callers re-check their predicate in a loop.
    fn wait(&self, timeout: Option<Duration>) -> bool;

    /// Deliver one wake
    ///
    /// Never blocks; posts accumulate until consumed.
    fn post(&self);

    /// Number of posts delivered but not yet consumed (hint, may be stale)
    fn pending(&self) -> u32;
}

// Platform-specific implementations
cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod futex_linux;
        pub use futex_linux::FutexSignal as PlatformSignal;
    } else {
        mod fallback;
        pub use fallback::FallbackSignal as PlatformSignal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_post_before_wait_not_lost() {
        let sig = PlatformSignal::new();
        sig.post();
        // Must return immediately even though nobody was waiting at post time
        assert!(sig.wait(Some(Duration::from_millis(10))));
    }

    #[test]
    fn test_posts_accumulate() {
        let sig = PlatformSignal::new();
        sig.post();
        sig.post();
        sig.post();
        assert_eq!(sig.pending(), 3);

        assert!(sig.wait(None));
        assert!(sig.wait(None));
        assert!(sig.wait(None));
        assert!(!sig.wait(Some(Duration::from_millis(10))));
    }

    #[test]
    fn test_wait_timeout() {
        let sig = PlatformSignal::new();
        let start = Instant::now();
        let woken = sig.wait(Some(Duration::from_millis(50)));
        let elapsed = start.elapsed();

        assert!(!woken);
        assert!(elapsed >= Duration::from_millis(40)); // Allow some slack
    }

    #[test]
    fn test_cross_thread_wake() {
        let sig = Arc::new(PlatformSignal::new());
        let sig2 = Arc::clone(&sig);

        let handle = thread::spawn(move || sig2.wait(Some(Duration::from_secs(10))));

        // Give the thread time to park
        thread::sleep(Duration::from_millis(50));
        sig.post();

        assert!(handle.join().unwrap());
    }
}
