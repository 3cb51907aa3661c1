//! Parsers for the Linux `/proc` filesystem.
//!
//! This module turns the raw text of `/proc/stat`, `/proc/meminfo` and
//! `/proc/loadavg` into percentages and load averages.

pub mod parser;

pub use parser::{
    CpuTicks, CpuUsageTracker, parse_cpu_ticks, parse_load_averages, parse_memory_usage, round2,
};
