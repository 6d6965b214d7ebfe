//! Digest demo - offloading a hash computation
//!
//! Shows the full job lifecycle from a caller's point of view:
//! allocate a slot, fill the parameter block, submit and block while
//! the worker runs the action, read the result, release the slot.
//!
//! Usage: digest [message ...]

use offload::{AsyncWorker, Priority, WorkerConfig};
use std::process::ExitCode;

const MAX_INPUT: usize = 256;

/// Parameter block for the digest action
///
/// The caller fills `input`/`input_len`; the action fills `digest`,
/// `result` and, on failure, `error_message`. Action-level failures
/// travel through these fields, never through the coordinator.
struct DigestParams {
    input: [u8; MAX_INPUT],
    input_len: usize,
    digest: u64,
    result: i32,
    error_message: &'static str,
}

impl DigestParams {
    fn from_message(msg: &str) -> Option<Self> {
        let bytes = msg.as_bytes();
        if bytes.len() > MAX_INPUT {
            return None;
        }
        let mut input = [0u8; MAX_INPUT];
        input[..bytes.len()].copy_from_slice(bytes);
        Some(DigestParams {
            input,
            input_len: bytes.len(),
            digest: 0,
            result: 0,
            error_message: "",
        })
    }
}

/// FNV-1a over the input buffer, run on the worker task
fn digest_action(p: &mut DigestParams) {
    if p.input_len > MAX_INPUT {
        p.result = -1;
        p.error_message = "input length exceeds buffer";
        return;
    }
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in &p.input[..p.input_len] {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    p.digest = hash;
    p.result = 0;
}

fn main() -> ExitCode {
    offload::init_logging();

    let messages: Vec<String> = {
        let args: Vec<String> = std::env::args().skip(1).collect();
        if args.is_empty() {
            vec![
                "hello, worker".to_string(),
                "the quick brown fox".to_string(),
                "".to_string(),
            ]
        } else {
            args
        }
    };

    let worker = AsyncWorker::new(WorkerConfig::new().job_count(2).waiting_list_size(4));
    if let Err(e) = worker.initialize("digest-worker", 128 * 1024, Priority::Low) {
        eprintln!("failed to start worker: {}", e);
        return ExitCode::FAILURE;
    }

    println!("=== Offload Digest Demo ===\n");

    for msg in &messages {
        let params = match DigestParams::from_message(msg) {
            Some(p) => p,
            None => {
                eprintln!("message too long (max {} bytes): {:?}", MAX_INPUT, msg);
                continue;
            }
        };

        let job = match worker.allocate_job() {
            Ok(j) => j,
            Err(e) => {
                eprintln!("allocate failed: {}", e);
                continue;
            }
        };

        match worker.submit_job(&job, digest_action, params) {
            Ok(out) => {
                if out.result == 0 {
                    println!("{:016x}  {:?}", out.digest, msg);
                } else {
                    eprintln!("action failed ({}): {}", out.result, out.error_message);
                }
            }
            Err(e) => eprintln!("submit failed: {}", e),
        }

        if let Err(e) = worker.release_job(job) {
            eprintln!("release failed: {}", e);
        }
    }

    worker.shutdown();
    ExitCode::SUCCESS
}
