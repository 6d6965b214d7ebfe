//! Worker thread spawning
//!
//! One long-lived OS thread per worker instance, spawned with an
//! explicit name and stack size. The configured priority is applied as
//! a niceness delta from inside the thread itself, best-effort: an
//! unprivileged process can always raise its nice value, never lower
//! it back, which is exactly the direction this subsystem needs.

use offload_core::constants::MIN_WORKER_STACK_SIZE;
use offload_core::{kwarn, Priority, StartError};
use std::thread::{self, JoinHandle};

/// Spawn the worker thread for one worker instance
///
/// `name` shows up in debuggers and panic messages. The thread applies
/// `priority` to itself before entering `body`.
pub fn spawn_worker<F>(
    name: &str,
    stack_size: usize,
    priority: Priority,
    body: F,
) -> Result<JoinHandle<()>, StartError>
where
    F: FnOnce() + Send + 'static,
{
    if stack_size < MIN_WORKER_STACK_SIZE {
        return Err(StartError::StackTooSmall);
    }

    thread::Builder::new()
        .name(name.to_string())
        .stack_size(stack_size)
        .spawn(move || {
            apply_nice(priority.nice());
            body();
        })
        .map_err(|_| StartError::SpawnFailed)
}

/// Raise the calling thread's nice value
///
/// On Linux, PRIO_PROCESS with pid 0 targets the calling thread.
#[cfg(unix)]
fn apply_nice(nice: i32) {
    if nice == 0 {
        return;
    }
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS as _, 0, nice) };
    if rc != 0 {
        kwarn!("could not apply worker niceness {}", nice);
    }
}

#[cfg(not(unix))]
fn apply_nice(_nice: i32) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_spawn_runs_body() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran2 = Arc::clone(&ran);

        let handle = spawn_worker("offload-test", MIN_WORKER_STACK_SIZE, Priority::Low, move || {
            ran2.store(true, Ordering::Release);
        })
        .unwrap();

        handle.join().unwrap();
        assert!(ran.load(Ordering::Acquire));
    }

    #[test]
    fn test_thread_is_named() {
        let handle = spawn_worker("offload-named", MIN_WORKER_STACK_SIZE, Priority::Normal, || {
            assert_eq!(thread::current().name(), Some("offload-named"));
        })
        .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_stack_too_small() {
        let result = spawn_worker("offload-tiny", 1024, Priority::Low, || {});
        assert!(matches!(result, Err(StartError::StackTooSmall)));
    }
}
