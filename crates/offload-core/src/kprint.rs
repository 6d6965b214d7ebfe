//! Leveled stderr logging for the worker subsystem
//!
//! Four levels, one macro each: `kerror!`, `kwarn!`, `kinfo!`,
//! `kdebug!`. Output goes to stderr with the handle locked so a line is
//! never interleaved with another thread's.
//!
//! # Environment Variables
//!
//! - `OFFLOAD_LOG_LEVEL=<level>` - 0/off, 1/error, 2/warn, 3/info, 4/debug
//! - `OFFLOAD_FLUSH_EPRINT=1` - Flush stderr after every line (useful
//!   when chasing a crash that eats buffered output)

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Verbosity threshold for the `k*!` macros
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl LogLevel {
    fn tag(self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "[ERROR]",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Info => "[INFO] ",
            LogLevel::Debug => "[DEBUG]",
        }
    }
}

static LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);
static FLUSH: AtomicBool = AtomicBool::new(false);
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Read `OFFLOAD_LOG_LEVEL` / `OFFLOAD_FLUSH_EPRINT` once
///
/// Runs implicitly on the first log line; call it explicitly when the
/// environment must be read before any worker is started.
pub fn init() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    FLUSH.store(
        crate::env::env_get_bool("OFFLOAD_FLUSH_EPRINT", false),
        Ordering::Relaxed,
    );

    if let Some(val) = crate::env::env_get_opt::<String>("OFFLOAD_LOG_LEVEL") {
        let level = match val.to_lowercase().as_str() {
            "off" | "0" => LogLevel::Off,
            "error" | "1" => LogLevel::Error,
            "warn" | "2" => LogLevel::Warn,
            "debug" | "4" => LogLevel::Debug,
            _ => LogLevel::Info,
        };
        LEVEL.store(level as u8, Ordering::Relaxed);
    }
}

/// Current verbosity threshold
pub fn log_level() -> LogLevel {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    match LEVEL.load(Ordering::Relaxed) {
        0 => LogLevel::Off,
        1 => LogLevel::Error,
        2 => LogLevel::Warn,
        3 => LogLevel::Info,
        _ => LogLevel::Debug,
    }
}

/// Override the threshold, ignoring the environment
pub fn set_log_level(level: LogLevel) {
    INITIALIZED.store(true, Ordering::SeqCst);
    LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Override per-line flushing, ignoring the environment
pub fn set_flush_enabled(enabled: bool) {
    FLUSH.store(enabled, Ordering::Relaxed);
}

/// Check whether lines at `level` would be emitted
#[inline]
pub fn level_enabled(level: LogLevel) -> bool {
    level != LogLevel::Off && level <= log_level()
}

#[doc(hidden)]
pub fn _klog_impl(level: LogLevel, args: std::fmt::Arguments<'_>) {
    if !level_enabled(level) {
        return;
    }
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = write!(handle, "{} ", level.tag());
    let _ = handle.write_fmt(args);
    let _ = handle.write_all(b"\n");
    if FLUSH.load(Ordering::Relaxed) {
        let _ = handle.flush();
    }
}

/// Error level log (shown unless logging is off)
#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Error,
            format_args!($($arg)*)
        );
    }};
}

/// Warning level log
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Warn,
            format_args!($($arg)*)
        );
    }};
}

/// Info level log
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Info,
            format_args!($($arg)*)
        );
    }};
}

/// Debug level log (most verbose)
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Debug,
            format_args!($($arg)*)
        );
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
    }

    // The threshold is process-global, so the assertions that touch it
    // live in one test and never race a parallel sibling.
    #[test]
    fn test_level_gating_and_macros() {
        set_log_level(LogLevel::Warn);
        assert!(level_enabled(LogLevel::Error));
        assert!(level_enabled(LogLevel::Warn));
        assert!(!level_enabled(LogLevel::Info));
        assert!(!level_enabled(LogLevel::Debug));

        set_log_level(LogLevel::Off);
        assert!(!level_enabled(LogLevel::Error));
        assert!(!level_enabled(LogLevel::Off));

        // Output suppressed; this only checks the macro plumbing
        kerror!("error {}", "msg");
        kwarn!("warn");
        kinfo!("info {}", 42);
        kdebug!("debug");
    }
}
