//! The sampling engine: scheduler, collector, parsers and presenter wired together.
//!
//! ```text
//! Scheduler tick ─► Collector (stat, meminfo, loadavg)
//!                      │ all three or nothing
//!                      ▼
//!                   Parsers ─► MetricsSample ─► Presenter ─► DisplaySink
//!                      │
//!                      └─ read failure ─────────────────────► ErrorSink
//! ```
//!
//! The host drives the engine through plain method calls: `start`, `stop`,
//! `update_interval`, `set_display_selection` and `collect_and_update`.

pub mod scheduler;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::collector::procfs::{CpuUsageTracker, parse_load_averages, parse_memory_usage};
use crate::collector::{CollectError, Collector, FileSystem};
use crate::config::{ConfigError, SampleConfig, interval_from_secs};
use crate::models::{DisplaySelection, MetricsSample, SharedSelection};
use crate::presenter::{self, DisplaySink, ErrorSink, MetricPicker};

pub use scheduler::{Scheduler, TickFn, TickFuture};

/// State shared between the engine handle and its timer task.
struct EngineInner<F: FileSystem> {
    collector: Collector<F>,
    /// Held only while parsing `/proc/stat`, never across a read.
    cpu: Mutex<CpuUsageTracker>,
    selection: SharedSelection,
    display: Arc<dyn DisplaySink>,
    errors: Arc<dyn ErrorSink>,
}

impl<F: FileSystem + 'static> EngineInner<F> {
    async fn collect_and_update(&self) -> Result<MetricsSample, CollectError> {
        let t0 = Instant::now();

        let raw = match self.collector.collect().await {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "failed to collect metrics");
                self.errors.report(&e.to_string());
                return Err(e);
            }
        };

        let cpu_percent = self
            .cpu
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .update(&raw.stat);

        let sample = MetricsSample {
            timestamp: chrono::Utc::now().timestamp(),
            cpu_percent,
            memory_percent: parse_memory_usage(&raw.meminfo),
            load_averages: parse_load_averages(&raw.loadavg),
        };

        let frame = presenter::render(&sample, &self.selection.load());
        self.display.show(&frame);

        debug!(
            duration_ms = t0.elapsed().as_millis() as u64,
            cpu = sample.cpu_percent,
            memory = sample.memory_percent,
            "cycle completed"
        );

        Ok(sample)
    }
}

/// Periodic CPU/memory/load sampler.
pub struct SampleEngine<F: FileSystem> {
    inner: Arc<EngineInner<F>>,
    scheduler: Scheduler,
    enabled: bool,
}

impl<F: FileSystem + 'static> SampleEngine<F> {
    /// Creates a stopped engine.
    ///
    /// # Arguments
    /// * `collector` - Reads the `/proc` sources
    /// * `config` - Initial interval and run gate
    /// * `display` - Receives rendered frames
    /// * `errors` - Receives collection failures
    pub fn new(
        collector: Collector<F>,
        config: SampleConfig,
        display: Arc<dyn DisplaySink>,
        errors: Arc<dyn ErrorSink>,
    ) -> Self {
        let inner = Arc::new(EngineInner {
            collector,
            cpu: Mutex::new(CpuUsageTracker::new()),
            selection: SharedSelection::default(),
            display,
            errors,
        });

        let tick_inner = Arc::clone(&inner);
        let tick: TickFn = Arc::new(move || -> TickFuture {
            let inner = Arc::clone(&tick_inner);
            Box::pin(async move {
                // Failures are already reported to the error sink.
                let _ = inner.collect_and_update().await;
            })
        });

        Self {
            inner,
            scheduler: Scheduler::new(config.interval, tick),
            enabled: config.enabled,
        }
    }

    /// Sets the initial display selection.
    pub fn with_selection(self, selection: DisplaySelection) -> Self {
        self.inner.selection.store(selection);
        self
    }

    /// Whether the host allowed the engine to run.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Starts (or restarts) periodic sampling. Must be called within a Tokio runtime.
    pub fn start(&self) {
        let restarted = self.scheduler.is_running();
        self.scheduler.start();
        info!(
            interval_ms = self.scheduler.interval().as_millis() as u64,
            restarted, "sampling started"
        );
    }

    /// Starts sampling only if the run gate is open. Returns whether it started.
    pub fn start_if_enabled(&self) -> bool {
        if !self.enabled {
            info!("sampling disabled by configuration");
            return false;
        }
        self.start();
        true
    }

    /// Stops periodic sampling and clears the display. Safe to call repeatedly.
    pub fn stop(&self) {
        if self.scheduler.stop() {
            info!("sampling stopped");
        }
        self.inner.display.clear();
    }

    /// Changes the sampling interval.
    ///
    /// A running engine is stopped and restarted so the new period applies
    /// immediately; a stopped engine only records the value.
    pub fn update_interval(&self, secs: f64) -> Result<(), ConfigError> {
        let interval = interval_from_secs(secs)?;
        let was_running = self.scheduler.set_interval(interval);
        debug!(interval_ms = interval.as_millis() as u64, was_running, "interval updated");

        if was_running {
            self.stop();
            self.start();
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        self.scheduler.interval()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Period the active timer was armed with, `None` when stopped.
    pub fn armed_period(&self) -> Option<Duration> {
        self.scheduler.armed_period()
    }

    pub fn display_selection(&self) -> DisplaySelection {
        self.inner.selection.load()
    }

    /// Replaces the display selection; the next render uses it.
    pub fn set_display_selection(&self, selection: DisplaySelection) {
        self.inner.selection.store(selection);
    }

    /// Runs one cycle now: read, parse, render, push to the display.
    ///
    /// On a read failure nothing is displayed, the message goes to the error
    /// sink, and the error is returned.
    pub async fn collect_and_update(&self) -> Result<MetricsSample, CollectError> {
        self.inner.collect_and_update().await
    }

    /// Lets the user choose the visible metrics, then refreshes the display.
    ///
    /// Returns `Ok(None)` when the picker was dismissed; the selection is then
    /// left unchanged and no refresh happens.
    pub async fn configure_display(
        &self,
        picker: &dyn MetricPicker,
    ) -> Result<Option<MetricsSample>, CollectError> {
        let Some(chosen) = picker.pick(self.display_selection()) else {
            return Ok(None);
        };

        let selection = DisplaySelection::from_metrics(&chosen);
        info!(metrics = ?selection.metrics(), "display selection changed");
        self.set_display_selection(selection);
        self.collect_and_update().await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockFs, STAT_SAMPLE_1, STAT_SAMPLE_2};
    use crate::collector::procfs::parse_cpu_ticks;
    use crate::models::Metric;
    use crate::presenter::EMPTY_SELECTION_PLACEHOLDER;
    use crate::presenter::testing::{FixedPicker, RecordingSink};

    fn engine_with(fs: MockFs, interval_secs: f64) -> (SampleEngine<MockFs>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let engine = SampleEngine::new(
            Collector::new(fs, "/proc"),
            SampleConfig::from_secs(interval_secs).unwrap(),
            sink.clone(),
            sink.clone(),
        );
        (engine, sink)
    }

    #[tokio::test]
    async fn test_collect_and_update_typical_system() {
        let (engine, sink) = engine_with(MockFs::typical_system(), 1.0);

        let sample = engine.collect_and_update().await.unwrap();

        assert_eq!(sample.cpu_percent, 0.0);
        assert!((sample.memory_percent - 60.0).abs() < 0.01);
        assert_eq!(sample.load_averages, vec![1.25, 0.75, 0.50]);
        assert_eq!(
            sink.last_status().unwrap(),
            "CPU: 0% | MEM: 60% | Load: 1.25, 0.75, 0.5"
        );
    }

    #[tokio::test]
    async fn test_cpu_counters_persist_across_cycles() {
        let fs = MockFs::typical_system();
        let (engine, sink) = engine_with(fs.clone(), 1.0);

        engine.collect_and_update().await.unwrap();
        fs.add_file("/proc/stat", STAT_SAMPLE_2);
        let sample = engine.collect_and_update().await.unwrap();

        assert!((sample.cpu_percent - 68.75).abs() < 0.01);
        assert!(sink.last_status().unwrap().starts_with("CPU: 68.75%"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_cycles_share_cpu_counters() {
        let fs = MockFs::typical_system();
        let (engine, sink) = engine_with(fs.clone(), 1.0);
        engine.collect_and_update().await.unwrap();
        assert_eq!(
            engine.inner.cpu.lock().unwrap().last(),
            parse_cpu_ticks(STAT_SAMPLE_1)
        );

        fs.add_file("/proc/stat", STAT_SAMPLE_2);
        let (a, b, c, d) = tokio::join!(
            engine.collect_and_update(),
            engine.collect_and_update(),
            engine.collect_and_update(),
            engine.collect_and_update(),
        );
        let mut usages: Vec<f64> = [a, b, c, d]
            .into_iter()
            .map(|r| r.unwrap().cpu_percent)
            .collect();
        usages.sort_by(f64::total_cmp);

        // Only the first cycle to take the lock sees a diff; the rest diff
        // sample 2 against itself.
        assert_eq!(usages[..3], [0.0, 0.0, 0.0]);
        assert!((usages[3] - 68.75).abs() < 0.01);
        assert_eq!(
            engine.inner.cpu.lock().unwrap().last(),
            parse_cpu_ticks(STAT_SAMPLE_2)
        );
        assert_eq!(sink.frames().len(), 5);
    }

    #[tokio::test]
    async fn test_read_failure_aborts_cycle() {
        let (engine, sink) = engine_with(MockFs::missing_meminfo(), 1.0);

        let err = engine.collect_and_update().await.unwrap_err();

        assert!(sink.frames().is_empty());
        assert_eq!(sink.errors(), vec![err.to_string()]);
        assert!(sink.errors()[0].contains("/proc/meminfo"));
    }

    #[tokio::test]
    async fn test_read_failure_does_not_touch_cpu_counters() {
        let fs = MockFs::typical_system();
        let (engine, _sink) = engine_with(fs.clone(), 1.0);
        engine.collect_and_update().await.unwrap();

        fs.add_file("/proc/stat", STAT_SAMPLE_2);
        fs.fail_reads("/proc/loadavg", "device busy");
        assert!(engine.collect_and_update().await.is_err());

        // The failed cycle never parsed STAT_SAMPLE_2, so this one diffs against sample 1.
        fs.add_file("/proc/loadavg", "1.25 0.75 0.50 2/123 12345\n");
        let sample = engine.collect_and_update().await.unwrap();
        assert!((sample.cpu_percent - 68.75).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_busy_system_tooltip_lists_everything() {
        let (engine, sink) = engine_with(MockFs::busy_system(), 1.0);
        engine.set_display_selection(DisplaySelection::from_metrics(&[Metric::Cpu]));

        let sample = engine.collect_and_update().await.unwrap();

        assert_eq!(sample.memory_percent, 95.0);
        let frame = sink.frames().pop().unwrap();
        assert_eq!(frame.status, "CPU: 0%");
        assert!(frame.tooltip.contains("Memory Usage: 95%"));
        assert!(frame.tooltip.contains("Load Average: 4.5, 3.2, 2.1"));
    }

    #[tokio::test]
    async fn test_degraded_sources_render_sentinels() {
        let (engine, sink) = engine_with(MockFs::degraded_system(), 1.0);

        let sample = engine.collect_and_update().await.unwrap();

        assert_eq!(sample.cpu_percent, 0.0);
        assert!(sample.memory_percent.is_nan());
        assert_eq!(sample.load_averages.len(), 1);
        assert_eq!(
            sink.last_status().unwrap(),
            "CPU: 0% | MEM: NaN% | Load: NaN"
        );
    }

    #[tokio::test]
    async fn test_selection_applies_to_next_render() {
        let (engine, sink) = engine_with(MockFs::typical_system(), 1.0);

        engine.set_display_selection(DisplaySelection::from_metrics(&[Metric::Memory]));
        engine.collect_and_update().await.unwrap();
        assert_eq!(sink.last_status().unwrap(), "MEM: 60%");

        engine.set_display_selection(DisplaySelection::none());
        engine.collect_and_update().await.unwrap();
        assert_eq!(sink.last_status().unwrap(), EMPTY_SELECTION_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_configure_display_refreshes_immediately() {
        let (engine, sink) = engine_with(MockFs::typical_system(), 1.0);

        let picker = FixedPicker(Some(vec![Metric::Load]));
        let sample = engine.configure_display(&picker).await.unwrap();

        assert!(sample.is_some());
        assert_eq!(sink.last_status().unwrap(), "Load: 1.25, 0.75, 0.5");
        assert_eq!(
            engine.display_selection(),
            DisplaySelection::from_metrics(&[Metric::Load])
        );
    }

    #[tokio::test]
    async fn test_configure_display_dismissed_keeps_selection() {
        let (engine, sink) = engine_with(MockFs::typical_system(), 1.0);

        let result = engine.configure_display(&FixedPicker(None)).await.unwrap();

        assert!(result.is_none());
        assert!(sink.frames().is_empty());
        assert_eq!(engine.display_selection(), DisplaySelection::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_samples_every_interval() {
        let (engine, sink) = engine_with(MockFs::typical_system(), 1.0);

        engine.start();
        assert!(engine.is_running());
        assert_eq!(engine.armed_period(), Some(Duration::from_secs(1)));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(sink.frames().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_tick_does_not_stop_scheduler() {
        let fs = MockFs::missing_meminfo();
        let (engine, sink) = engine_with(fs.clone(), 1.0);

        engine.start();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(sink.errors().len(), 1);
        assert!(engine.is_running());

        fs.add_file("/proc/meminfo", "MemTotal: 100 kB\nMemAvailable: 25 kB\n");
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(sink.frames().len(), 1);
        assert!(sink.last_status().unwrap().contains("MEM: 75%"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_twice_clears_display_and_stays_stopped() {
        let (engine, sink) = engine_with(MockFs::typical_system(), 1.0);
        engine.start();

        engine.stop();
        engine.stop();

        assert!(!engine.is_running());
        assert_eq!(engine.armed_period(), None);
        assert_eq!(sink.clears(), 2);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(sink.frames().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_interval_while_stopped_does_not_start() {
        let (engine, sink) = engine_with(MockFs::typical_system(), 1.0);

        engine.update_interval(5.0).unwrap();

        assert!(!engine.is_running());
        assert_eq!(engine.interval(), Duration::from_secs(5));
        assert_eq!(sink.clears(), 0);

        engine.start();
        assert_eq!(engine.armed_period(), Some(Duration::from_secs(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_interval_while_running_rearms() {
        let (engine, sink) = engine_with(MockFs::typical_system(), 1.0);
        engine.start();

        engine.update_interval(3.0).unwrap();

        assert!(engine.is_running());
        assert_eq!(engine.armed_period(), Some(Duration::from_secs(3)));
        assert_eq!(sink.clears(), 1);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(sink.frames().is_empty());
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(sink.frames().len(), 1);
    }

    #[tokio::test]
    async fn test_update_interval_rejects_invalid_value() {
        let (engine, _sink) = engine_with(MockFs::typical_system(), 1.0);

        assert!(engine.update_interval(0.0).is_err());
        assert!(engine.update_interval(-2.0).is_err());
        assert_eq!(engine.interval(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_nanosecond_interval_keeps_timer_alive() {
        let (engine, sink) = engine_with(MockFs::typical_system(), 1.0);
        engine.start();

        assert_eq!(
            engine.update_interval(1e-10),
            Err(ConfigError::IntervalOutOfRange(1e-10))
        );

        assert!(engine.is_running());
        assert_eq!(engine.armed_period(), Some(Duration::from_secs(1)));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(sink.frames().len(), 1);
    }

    #[tokio::test]
    async fn test_start_if_enabled_honors_gate() {
        let sink = Arc::new(RecordingSink::default());
        let engine = SampleEngine::new(
            Collector::new(MockFs::typical_system(), "/proc"),
            SampleConfig::default().with_enabled(false),
            sink.clone(),
            sink.clone(),
        );

        assert!(!engine.start_if_enabled());
        assert!(!engine.is_running());
    }
}
