#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` centralises how rbh-sync emits diagnostics. Every pipeline stage
//! logs through the [`tracing`] facade using a fixed set of targets, one per
//! [`Area`], so operators can raise the verbosity of a single stage without
//! drowning in the others.
//!
//! # Design
//!
//! - [`Area`] enumerates the subsystems and their `rbh::<area>` targets.
//! - The `trace_*!` macros wrap the standard tracing macros with the matching
//!   target and a default level.
//! - [`VerbosityConfig`] maps the command line `-v` count (plus per-area
//!   overrides) onto a [`tracing_subscriber::EnvFilter`] directive.
//! - [`init_tracing`] installs a stderr formatter; the `RBH_SYNC_LOG`
//!   environment variable, when set, replaces the computed directive.
//! - [`RecordingLayer`] collects events into a thread-local buffer so tests
//!   can assert on diagnostics via [`drain_events`].
//!
//! # Examples
//!
//! ```
//! use logging::{Area, VerbosityConfig};
//! use tracing::level_filters::LevelFilter;
//!
//! let config = VerbosityConfig::from_verbose_level(1).with_area(Area::Convert, LevelFilter::TRACE);
//! assert_eq!(config.directive(), "info,rbh::convert=trace");
//! ```

mod config;
mod levels;
mod recorder;
mod tracing_bridge;
mod tracing_macros;

pub use config::VerbosityConfig;
pub use levels::Area;
pub use recorder::{DiagnosticEvent, RecordingLayer, drain_events};
pub use tracing_bridge::{LOG_ENV, init_tracing, init_tracing_with_writer};
