//! Shared data models: metrics produced by one cycle and the display selection.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Result of one sampling cycle.
///
/// `memory_percent` may be `NaN` and `load_averages` may hold fewer than three
/// values or `NaN` entries when the source text is malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSample {
    /// Unix timestamp (seconds) of the cycle.
    pub timestamp: i64,
    /// CPU usage, 0–100, two decimals.
    pub cpu_percent: f64,
    /// Memory usage, 0–100, two decimals.
    pub memory_percent: f64,
    /// 1, 5 and 15 minute load averages.
    pub load_averages: Vec<f64>,
}

/// One of the metrics the status line can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cpu,
    Memory,
    Load,
}

impl Metric {
    /// All metrics in rendering order.
    pub const ALL: [Metric; 3] = [Metric::Cpu, Metric::Memory, Metric::Load];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Cpu => "cpu",
            Metric::Memory => "memory",
            Metric::Load => "load",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Metric::Cpu),
            "memory" | "mem" => Ok(Metric::Memory),
            "load" => Ok(Metric::Load),
            other => Err(format!("unknown metric '{}'", other)),
        }
    }
}

/// Which metrics appear in the compact status line.
///
/// Has no effect on sampling; every cycle reads and parses all three sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySelection {
    pub show_cpu: bool,
    pub show_memory: bool,
    pub show_load: bool,
}

impl Default for DisplaySelection {
    fn default() -> Self {
        Self {
            show_cpu: true,
            show_memory: true,
            show_load: true,
        }
    }
}

impl DisplaySelection {
    /// Selection with every metric hidden.
    pub fn none() -> Self {
        Self {
            show_cpu: false,
            show_memory: false,
            show_load: false,
        }
    }

    /// Builds a selection showing exactly the given metrics.
    pub fn from_metrics(metrics: &[Metric]) -> Self {
        Self {
            show_cpu: metrics.contains(&Metric::Cpu),
            show_memory: metrics.contains(&Metric::Memory),
            show_load: metrics.contains(&Metric::Load),
        }
    }

    pub fn shows(&self, metric: Metric) -> bool {
        match metric {
            Metric::Cpu => self.show_cpu,
            Metric::Memory => self.show_memory,
            Metric::Load => self.show_load,
        }
    }

    /// Enabled metrics in rendering order.
    pub fn metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| self.shows(*m))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        !(self.show_cpu || self.show_memory || self.show_load)
    }
}

/// Display selection shared between the host (writer) and the render path.
///
/// Each flag is stored independently, so a reader sees every completed
/// assignment without taking a lock.
#[derive(Debug)]
pub struct SharedSelection {
    show_cpu: AtomicBool,
    show_memory: AtomicBool,
    show_load: AtomicBool,
}

impl SharedSelection {
    pub fn new(selection: DisplaySelection) -> Self {
        Self {
            show_cpu: AtomicBool::new(selection.show_cpu),
            show_memory: AtomicBool::new(selection.show_memory),
            show_load: AtomicBool::new(selection.show_load),
        }
    }

    pub fn load(&self) -> DisplaySelection {
        DisplaySelection {
            show_cpu: self.show_cpu.load(Ordering::Acquire),
            show_memory: self.show_memory.load(Ordering::Acquire),
            show_load: self.show_load.load(Ordering::Acquire),
        }
    }

    pub fn store(&self, selection: DisplaySelection) {
        self.show_cpu.store(selection.show_cpu, Ordering::Release);
        self.show_memory
            .store(selection.show_memory, Ordering::Release);
        self.show_load.store(selection.show_load, Ordering::Release);
    }
}

impl Default for SharedSelection {
    fn default() -> Self {
        Self::new(DisplaySelection::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection_shows_everything() {
        let selection = DisplaySelection::default();
        assert_eq!(selection.metrics(), Metric::ALL.to_vec());
        assert!(!selection.is_empty());
    }

    #[test]
    fn test_selection_from_metrics_keeps_fixed_order() {
        let selection = DisplaySelection::from_metrics(&[Metric::Load, Metric::Cpu]);
        assert_eq!(selection.metrics(), vec![Metric::Cpu, Metric::Load]);
        assert!(!selection.show_memory);
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("CPU".parse::<Metric>().unwrap(), Metric::Cpu);
        assert_eq!(" mem ".parse::<Metric>().unwrap(), Metric::Memory);
        assert_eq!("load".parse::<Metric>().unwrap(), Metric::Load);
        assert!("disk".parse::<Metric>().is_err());
    }

    #[test]
    fn test_shared_selection_round_trip() {
        let shared = SharedSelection::default();
        assert_eq!(shared.load(), DisplaySelection::default());

        shared.store(DisplaySelection::none());
        assert!(shared.load().is_empty());
    }

    #[test]
    fn test_sample_serializes_nan_as_null() {
        let sample = MetricsSample {
            timestamp: 1700000000,
            cpu_percent: 12.5,
            memory_percent: f64::NAN,
            load_averages: vec![1.0],
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains("\"memory_percent\":null"));
        assert!(json.contains("\"cpu_percent\":12.5"));
    }
}
