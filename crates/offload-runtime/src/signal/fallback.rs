//! Fallback counting signal using std::sync::Condvar
//!
//! Used on platforms without futex support.
//! Less efficient but portable.

use super::Signal;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Condvar-based counting signal (fallback)
pub struct FallbackSignal {
    /// Undelivered post count
    count: Mutex<u32>,

    /// Condition variable waiters park on
    condvar: Condvar,
}

impl FallbackSignal {
    /// Create a signal with no pending posts
    pub fn new() -> Self {
        Self {
            count: Mutex::new(0),
            condvar: Condvar::new(),
        }
    }
}

impl Default for FallbackSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl Signal for FallbackSignal {
    fn wait(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut count = self.count.lock().unwrap();

        loop {
            if *count > 0 {
                *count -= 1;
                return true;
            }

            match deadline {
                Some(d) => {
                    let remaining = d.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return false;
                    }
                    let (guard, _) = self.condvar.wait_timeout(count, remaining).unwrap();
                    count = guard;
                }
                None => {
                    count = self.condvar.wait(count).unwrap();
                }
            }
        }
    }

    fn post(&self) {
        {
            let mut count = self.count.lock().unwrap();
            *count += 1;
        }
        self.condvar.notify_one();
    }

    fn pending(&self) -> u32 {
        *self.count.lock().unwrap()
    }
}
