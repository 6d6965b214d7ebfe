//! Stress test - many callers, few job slots
//!
//! Hammers allocate/submit/release from N threads against a small
//! pool and reports throughput. A good smoke test for the waiting
//! list under real contention.
//!
//! Usage: stress [threads] [jobs-per-thread]

use offload::{AsyncWorker, Priority, WorkerConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[derive(Default)]
struct WorkParams {
    seed: u64,
    rounds: u32,
    output: u64,
    result: i32,
}

/// A short CPU-bound mix so the worker actually does something
fn churn_action(p: &mut WorkParams) {
    let mut x = p.seed;
    for _ in 0..p.rounds {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
    }
    p.output = x;
    p.result = 0;
}

fn main() {
    println!("=== Offload Stress Test ===\n");

    offload::init_logging();

    let num_threads: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(8);
    let jobs_per_thread: u64 = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(5_000);

    println!(
        "{} caller threads x {} jobs each, 2 slots, waiting list {}\n",
        num_threads,
        jobs_per_thread,
        num_threads
    );

    let config = WorkerConfig::new()
        .job_count(2)
        .waiting_list_size(num_threads);
    let worker = AsyncWorker::new(config);
    worker
        .initialize("stress-worker", 128 * 1024, Priority::Normal)
        .expect("worker start");
    let worker = Arc::new(worker);

    let completed = Arc::new(AtomicU64::new(0));
    let errors = Arc::new(AtomicU64::new(0));
    let start = Instant::now();

    let mut handles = Vec::with_capacity(num_threads);
    for t in 0..num_threads as u64 {
        let worker = Arc::clone(&worker);
        let completed = Arc::clone(&completed);
        let errors = Arc::clone(&errors);
        handles.push(thread::spawn(move || {
            for i in 0..jobs_per_thread {
                let job = match worker.allocate_job() {
                    Ok(j) => j,
                    Err(_) => {
                        errors.fetch_add(1, Ordering::Relaxed);
                        continue;
                    }
                };
                let params = WorkParams {
                    seed: t.wrapping_mul(0x9e37_79b9).wrapping_add(i) | 1,
                    rounds: 64,
                    ..Default::default()
                };
                match worker.submit_job(&job, churn_action, params) {
                    Ok(out) => {
                        assert_ne!(out.output, 0);
                        completed.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(_) => {
                        errors.fetch_add(1, Ordering::Relaxed);
                    }
                }
                if worker.release_job(job).is_err() {
                    errors.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let elapsed = start.elapsed();
    let done = completed.load(Ordering::Relaxed);
    let errs = errors.load(Ordering::Relaxed);
    let expected = num_threads as u64 * jobs_per_thread;

    println!("Completed: {}/{} jobs ({} errors)", done, expected, errs);
    println!("Elapsed:   {:?}", elapsed);
    println!(
        "Rate:      {:.0} jobs/sec",
        done as f64 / elapsed.as_secs_f64()
    );

    match Arc::try_unwrap(worker) {
        Ok(w) => w.shutdown(),
        Err(_) => unreachable!("all callers joined"),
    }

    if done == expected && errs == 0 {
        println!("\nPASS");
    } else {
        println!("\nFAIL");
        std::process::exit(1);
    }
}
