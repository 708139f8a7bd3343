#![deny(missing_docs)]
//! Shared logging utilities for the pixpress workspace.
//!
//! This crate provides the `pix_*` logging macros used across the codebase,
//! the operator diagnostic counter, and a minimal test initializer for the
//! global logger.

use std::cell::Cell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Number of operator diagnostics (`pix_error!`) emitted on this thread.
    static DIAGNOSTICS: Cell<u64> = const { Cell::new(0) };
}

/// Records one operator diagnostic for the current thread.
///
/// Called by `pix_error!`; rarely useful on its own.
pub fn record_diagnostic() {
    DIAGNOSTICS.with(|v| v.set(v.get() + 1));
}

/// Number of operator diagnostics recorded on the current thread.
pub fn diagnostic_count() -> u64 {
    DIAGNOSTICS.with(|v| v.get())
}

/// Resets the diagnostic counter of the current thread to zero.
pub fn reset_diagnostics() {
    DIAGNOSTICS.with(|v| v.set(0));
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! pix_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! pix_info {
    ($($arg:tt)*) => {{
        $crate::log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! pix_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! pix_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!($($arg)*);
    }};
}

/// Logs an error-level message and counts it as an operator diagnostic.
#[macro_export]
macro_rules! pix_error {
    ($($arg:tt)*) => {{
        $crate::record_diagnostic();
        $crate::log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::{diagnostic_count, reset_diagnostics};

    #[test]
    fn error_macro_counts_diagnostics_per_thread() {
        reset_diagnostics();
        pix_warn!("not a diagnostic");
        assert_eq!(diagnostic_count(), 0);

        pix_error!("first {}", 1);
        pix_error!("second");
        assert_eq!(diagnostic_count(), 2);

        let other = std::thread::spawn(diagnostic_count).join().unwrap();
        assert_eq!(other, 0);

        reset_diagnostics();
        assert_eq!(diagnostic_count(), 0);
    }
}
