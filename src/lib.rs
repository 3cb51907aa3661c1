//! statline - periodic CPU, memory and load sampling for status bars.
//!
//! Provides:
//! - `collector`: reading and parsing `/proc/stat`, `/proc/meminfo`, `/proc/loadavg`
//! - `engine`: the timer-driven `SampleEngine` and its `Scheduler`
//! - `presenter`: status line and tooltip rendering, display/error sinks
//! - `models`: `MetricsSample` and `DisplaySelection`
//! - `config`: `SampleConfig` and interval validation
//! - `fmt`: number formatting helpers
//!
//! The `statlined` binary drives the engine from the command line.

pub mod collector;
pub mod config;
pub mod engine;
pub mod fmt;
pub mod models;
pub mod presenter;

/// Crate version with the git SHA it was built from.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")");

pub use engine::SampleEngine;
