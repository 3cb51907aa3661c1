//! System metrics collector for Linux.
//!
//! This module provides infrastructure for reading CPU, memory and load
//! information from the Linux `/proc` filesystem, with support for mocking
//! for testing on macOS.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  Collector                   │
//! │   /proc/stat   /proc/meminfo   /proc/loadavg │
//! └──────────────────────┬───────────────────────┘
//!                        │
//!                 ┌──────▼──────┐
//!                 │  FileSystem │ (trait)
//!                 └──────┬──────┘
//!              ┌─────────┴─────────┐
//!       ┌──────▼──────┐     ┌──────▼──────┐
//!       │   RealFs    │     │   MockFs    │
//!       │  (Linux)    │     │  (Testing)  │
//!       └─────────────┘     └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use statline::collector::{Collector, MockFs};
//! use statline::collector::procfs::parse_memory_usage;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let collector = Collector::new(MockFs::typical_system(), "/proc");
//! let raw = collector.collect().await.unwrap();
//! assert_eq!(parse_memory_usage(&raw.meminfo), 60.0);
//! # });
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use collector::{CollectError, Collector, RawSources};
pub use mock::MockFs;
pub use traits::{FileSystem, RealFs};
