#![deny(missing_docs)]
//! Shared logging utilities for the photodump workspace.
//!
//! This crate provides the `pd_*` logging macros used across the codebase,
//! a thread-local "current job" tag that the macros prepend to every line,
//! and a minimal test initializer for the global logger.

use std::cell::Cell;

thread_local! {
    /// Identifier of the job the current thread is working on (0 = none).
    static CURRENT_JOB: Cell<u64> = const { Cell::new(0) };
}

/// Tags log lines emitted from the current thread with `job_id`.
/// Pass 0 to clear the tag.
pub fn set_current_job(job_id: u64) {
    CURRENT_JOB.with(|v| v.set(job_id));
}

/// Returns the job tag of the current thread, 0 when none is set.
pub fn current_job() -> u64 {
    CURRENT_JOB.with(|v| v.get())
}

/// Prefix placed in front of log lines; empty while no job is tagged.
#[doc(hidden)]
pub fn job_prefix() -> String {
    match current_job() {
        0 => String::new(),
        id => format!("[job {id}] "),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! pd_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! pd_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! pd_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! pd_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! pd_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may have installed the logger already.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
