//! crates/logging/src/tracing_macros.rs
//! Per-area wrappers around the standard tracing macros.
//!
//! Each macro fixes the `rbh::<area>` target and a default level. A leading
//! `error:`, `warn:`, `info:`, `debug:` or `trace:` selects another level:
//!
//! ```ignore
//! trace_convert!(warn: "skipping entry without an id");
//! trace_commit!(events = 12, "batch applied");
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __area_event {
    ($target:literal, $default:ident, error: $($arg:tt)*) => {
        ::tracing::error!(target: $target, $($arg)*)
    };
    ($target:literal, $default:ident, warn: $($arg:tt)*) => {
        ::tracing::warn!(target: $target, $($arg)*)
    };
    ($target:literal, $default:ident, info: $($arg:tt)*) => {
        ::tracing::info!(target: $target, $($arg)*)
    };
    ($target:literal, $default:ident, debug: $($arg:tt)*) => {
        ::tracing::debug!(target: $target, $($arg)*)
    };
    ($target:literal, $default:ident, trace: $($arg:tt)*) => {
        ::tracing::trace!(target: $target, $($arg)*)
    };
    ($target:literal, $default:ident, $($arg:tt)*) => {
        ::tracing::$default!(target: $target, $($arg)*)
    };
}

/// Entry source diagnostics, `trace` by default.
#[macro_export]
macro_rules! trace_source {
    ($($arg:tt)*) => {
        $crate::__area_event!("rbh::source", trace, $($arg)*)
    };
}

/// Projection and conversion diagnostics, `debug` by default.
#[macro_export]
macro_rules! trace_convert {
    ($($arg:tt)*) => {
        $crate::__area_event!("rbh::convert", debug, $($arg)*)
    };
}

/// Batching diagnostics, `trace` by default.
#[macro_export]
macro_rules! trace_chunk {
    ($($arg:tt)*) => {
        $crate::__area_event!("rbh::chunk", trace, $($arg)*)
    };
}

/// Commit diagnostics, `debug` by default.
#[macro_export]
macro_rules! trace_commit {
    ($($arg:tt)*) => {
        $crate::__area_event!("rbh::commit", debug, $($arg)*)
    };
}

/// Run-level diagnostics, `info` by default.
#[macro_export]
macro_rules! trace_sync {
    ($($arg:tt)*) => {
        $crate::__area_event!("rbh::sync", info, $($arg)*)
    };
}

/// Backend diagnostics, `debug` by default.
#[macro_export]
macro_rules! trace_backend {
    ($($arg:tt)*) => {
        $crate::__area_event!("rbh::backend", debug, $($arg)*)
    };
}
