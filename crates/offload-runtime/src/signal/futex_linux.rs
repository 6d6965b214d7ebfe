//! Linux futex-based counting signal
//!
//! The futex word is a counter of undelivered posts:
//! - wait: decrement if > 0, otherwise FUTEX_WAIT expecting 0
//! - post: increment, then FUTEX_WAKE one waiter
//!
//! A counter (rather than a binary flag) is required here: the worker
//! task may post a job's completion before the owning caller reaches
//! its wait, and that post must still be consumable.

use super::Signal;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Futex-backed counting signal
pub struct FutexSignal {
    /// Undelivered post count
    count: AtomicU32,
}

impl FutexSignal {
    /// Create a signal with no pending posts
    pub fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }
}

impl Default for FutexSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl Signal for FutexSignal {
    fn wait(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            // Consume a pending post if one exists
            let current = self.count.load(Ordering::Acquire);
            if current > 0 {
                if self
                    .count
                    .compare_exchange_weak(
                        current,
                        current - 1,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    )
                    .is_ok()
                {
                    return true;
                }
                continue; // Another waiter raced us, re-read
            }

            // Nothing pending: sleep until the word changes
            let mut ts = libc::timespec {
                tv_sec: 0,
                tv_nsec: 0,
            };
            let ts_ptr = match deadline {
                Some(d) => {
                    let remaining = d.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return false;
                    }
                    ts.tv_sec = remaining.as_secs() as i64;
                    ts.tv_nsec = remaining.subsec_nanos() as i64;
                    &ts as *const libc::timespec
                }
                None => std::ptr::null(),
            };

            // FUTEX_WAIT: sleep while count == 0
            let rc = unsafe {
                libc::syscall(
                    libc::SYS_futex,
                    self.count.as_ptr(),
                    libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
                    0u32,                    // Expected value (sleep if count == 0)
                    ts_ptr,                  // Timeout (relative)
                    std::ptr::null::<u32>(), // uaddr2 (unused)
                    0u32,                    // val3 (unused)
                )
            };

            if rc == -1 {
                let errno = unsafe { *libc::__errno_location() };
                if errno == libc::ETIMEDOUT {
                    return false;
                }
                // EAGAIN = count changed before we slept, EINTR = signal.
                // Both mean "go around and re-check the counter".
            }
        }
    }

    fn post(&self) {
        self.count.fetch_add(1, Ordering::Release);

        // FUTEX_WAKE: wake 1 waiter
        unsafe {
            libc::syscall(
                libc::SYS_futex,
                self.count.as_ptr(),
                libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
                1i32, // Wake at most 1 waiter
                std::ptr::null::<libc::timespec>(),
                std::ptr::null::<u32>(),
                0u32,
            );
        }
    }

    fn pending(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}
