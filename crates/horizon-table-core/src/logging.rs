//! Logging facilities for Horizon Table.
//!
//! This module provides:
//! - Target and span name constants for the `tracing` crate
//! - A performance span guard for timing long-running model operations
//! - Crate-prefixed tracing macros with consistent target naming
//!
//! # Tracing Integration
//!
//! Horizon Table uses the `tracing` crate for instrumentation and never
//! installs a subscriber itself. To see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_table::model=debug")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```

/// Span names used throughout Horizon Table for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Full re-sort of a sorted view.
    pub const RESORT: &str = "horizon_table::resort";
    /// Incremental reposition of a single row.
    pub const REPOSITION: &str = "horizon_table::reposition";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_table_core::signal";
    /// Reentrancy gate target.
    pub const REENTRANCY: &str = "horizon_table_core::reentrancy";
    /// Table model target.
    pub const MODEL: &str = "horizon_table::model";
    /// Sorted view target.
    pub const SORT: &str = "horizon_table::model::sort";
    /// Performance spans target.
    pub const PERF: &str = "horizon_table::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are thin wrappers around the `tracing` crate macros using the
/// table model target.
#[macro_export]
macro_rules! table_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_table::model", $($arg)*)
    };
}

#[macro_export]
macro_rules! table_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_table::model", $($arg)*)
    };
}

#[macro_export]
macro_rules! table_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_table::model", $($arg)*)
    };
}
