//! Parsers for `/proc` filesystem files.
//!
//! Memory and load parsing are pure functions over the file content. CPU usage
//! is a rate, so it is computed by [`CpuUsageTracker`], which keeps the counters
//! of the previous reading.
//!
//! None of these parsers fail: text that does not follow the `/proc` format
//! degrades to `0`, `NaN`, or a shorter load sequence.

/// Index of the idle counter among the numeric fields of a `cpu` line.
const IDLE_FIELD: usize = 3;

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Cumulative tick counters of the aggregate `cpu` line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTicks {
    pub idle: u64,
    pub total: u64,
}

/// Extracts idle/total ticks from the aggregate `cpu` line of `/proc/stat`.
///
/// Per-core lines (`cpu0`, `cpu1`, ...) are ignored. Returns `None` when the
/// aggregate line is absent. Fields that are not numbers count as zero.
pub fn parse_cpu_ticks(content: &str) -> Option<CpuTicks> {
    let line = content
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))?;

    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|s| s.parse().unwrap_or(0))
        .collect();

    Some(CpuTicks {
        idle: fields.get(IDLE_FIELD).copied().unwrap_or(0),
        total: fields.iter().fold(0u64, |acc, v| acc.saturating_add(*v)),
    })
}

/// Stateful CPU usage computation over successive `/proc/stat` readings.
///
/// The previous reading is either fully present or fully absent, so idle and
/// total can never desynchronize.
#[derive(Debug, Default)]
pub struct CpuUsageTracker {
    last: Option<CpuTicks>,
}

impl CpuUsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters stored by the last successful parse.
    pub fn last(&self) -> Option<CpuTicks> {
        self.last
    }

    /// Feeds one `/proc/stat` reading and returns CPU usage in percent.
    ///
    /// Returns `0` when the aggregate line is missing (stored counters are left
    /// as they were), on the first reading (no baseline), and when the total
    /// did not advance. Otherwise returns the busy share of elapsed ticks,
    /// rounded to two decimals. Every successful parse replaces the baseline.
    pub fn update(&mut self, content: &str) -> f64 {
        let Some(ticks) = parse_cpu_ticks(content) else {
            return 0.0;
        };

        match self.last.replace(ticks) {
            None => 0.0,
            Some(prev) => {
                let idle_diff = ticks.idle as f64 - prev.idle as f64;
                let total_diff = ticks.total as f64 - prev.total as f64;
                if total_diff == 0.0 {
                    0.0
                } else {
                    round2((total_diff - idle_diff) / total_diff * 100.0)
                }
            }
        }
    }
}

/// Extracts the integer following `label` on the first line that starts with it.
///
/// Returns `0` when no line carries the label or the value is not an integer.
fn parse_kb_field(content: &str, label: &str) -> u64 {
    content
        .lines()
        .find_map(|line| line.strip_prefix(label))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Computes memory usage in percent from `/proc/meminfo` content.
///
/// Usage is `(MemTotal - MemAvailable) / MemTotal`, rounded to two decimals.
/// Missing labels read as `0`; when both are missing the result is `NaN`.
pub fn parse_memory_usage(content: &str) -> f64 {
    let total = parse_kb_field(content, "MemTotal:") as f64;
    let available = parse_kb_field(content, "MemAvailable:") as f64;
    let used = total - available;
    round2(used / total * 100.0)
}

/// Parses the 1, 5 and 15 minute load averages from `/proc/loadavg` content.
///
/// The content is split on single spaces and the first three tokens are read
/// as floats. Tokens that are not numbers become `NaN`; input with fewer than
/// three tokens yields a shorter sequence.
pub fn parse_load_averages(content: &str) -> Vec<f64> {
    content
        .split(' ')
        .take(3)
        .map(|s| s.trim().parse().unwrap_or(f64::NAN))
        .collect()
}
