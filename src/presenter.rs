//! Rendering of metrics samples into status-bar text.
//!
//! The compact status line shows only the metrics in the current
//! [`DisplaySelection`]; the tooltip always shows all three.

use serde::Serialize;

use crate::fmt::{format_load, format_number};
use crate::models::{DisplaySelection, Metric, MetricsSample};

/// Shown instead of an empty status line when every metric is hidden.
pub const EMPTY_SELECTION_PLACEHOLDER: &str = "Select metrics to display";

/// Last tooltip line, telling the user how to change the selection.
pub const TOOLTIP_TRAILER: &str = "Click to choose which metrics to display";

/// Identifier of the host action that opens the metric picker.
pub const CONFIGURE_ACTION: &str = "statline.selectMetrics";

/// Everything the display collaborator needs for one update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusFrame {
    pub status: String,
    pub tooltip: String,
    /// Action bound to the status item (opens the picker).
    pub action: &'static str,
    pub sample: MetricsSample,
}

/// Receives rendered frames.
pub trait DisplaySink: Send + Sync {
    fn show(&self, frame: &StatusFrame);

    /// Removes any rendered output.
    fn clear(&self);
}

/// Receives per-cycle failure messages.
pub trait ErrorSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Multi-select picker over {CPU, Memory, Load}.
pub trait MetricPicker {
    /// Returns the chosen subset, or `None` if the user dismissed the picker.
    fn pick(&self, current: DisplaySelection) -> Option<Vec<Metric>>;
}

fn segment(metric: Metric, sample: &MetricsSample) -> String {
    match metric {
        Metric::Cpu => format!("CPU: {}%", format_number(sample.cpu_percent)),
        Metric::Memory => format!("MEM: {}%", format_number(sample.memory_percent)),
        Metric::Load => format!("Load: {}", format_load(&sample.load_averages)),
    }
}

/// Renders the compact status line, e.g. `"CPU: 50% | MEM: 30% | Load: 1, 0.75, 0.5"`.
pub fn render_status(sample: &MetricsSample, selection: &DisplaySelection) -> String {
    if selection.is_empty() {
        return EMPTY_SELECTION_PLACEHOLDER.to_string();
    }

    selection
        .metrics()
        .into_iter()
        .map(|metric| segment(metric, sample))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Renders the multi-line tooltip with every metric, regardless of selection.
pub fn render_tooltip(sample: &MetricsSample) -> String {
    format!(
        "System Resources\nCPU Usage: {}%\nMemory Usage: {}%\nLoad Average: {}\n\n{}",
        format_number(sample.cpu_percent),
        format_number(sample.memory_percent),
        format_load(&sample.load_averages),
        TOOLTIP_TRAILER
    )
}

/// Renders a full frame for the display sink.
pub fn render(sample: &MetricsSample, selection: &DisplaySelection) -> StatusFrame {
    StatusFrame {
        status: render_status(sample, selection),
        tooltip: render_tooltip(sample),
        action: CONFIGURE_ACTION,
        sample: sample.clone(),
    }
}
